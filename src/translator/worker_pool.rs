//! 共有カーソル方式のワーカープール
//!
//! `min(並列数, バッチ数)` 個のワーカーが共有カーソルから次のバッチを取り合う。
//! 各バッチはちょうど1回だけ取り出される。

use super::batcher::Batch;
use super::progress::{GlobalProgress, ProgressObserver};
use crate::backend::TranslationBackend;
use crate::error::BackendError;
use crate::store::{lock_store, SharedStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 1ファイル分のバッチ処理結果
#[derive(Debug, Default)]
pub struct PoolReport {
    pub workers: usize,
    pub batches_succeeded: usize,
    /// キャンセルで取り出されなかったバッチ
    pub batches_skipped: usize,
    /// 取り出したがストアに反映できなかったバッチ（実行中のファイル削除など）
    pub batches_unapplied: usize,
    pub entries_attempted: usize,
    pub entries_translated: usize,
    pub failures: Vec<BackendError>,
}

impl PoolReport {
    fn merge(&mut self, outcome: WorkerOutcome) {
        self.batches_succeeded += outcome.succeeded;
        self.batches_unapplied += outcome.unapplied;
        self.entries_attempted += outcome.attempted;
        self.entries_translated += outcome.translated;
        self.failures.extend(outcome.failures);
    }
}

#[derive(Default)]
struct WorkerOutcome {
    succeeded: usize,
    unapplied: usize,
    attempted: usize,
    translated: usize,
    failures: Vec<BackendError>,
}

pub struct WorkerPool {
    backend: Arc<dyn TranslationBackend>,
    store: SharedStore,
    concurrency: usize,
    progress: Arc<GlobalProgress>,
    observer: Option<ProgressObserver>,
    cancel: CancellationToken,
}

impl WorkerPool {
    pub fn new(backend: Arc<dyn TranslationBackend>, store: SharedStore, concurrency: usize) -> Self {
        Self {
            backend,
            store,
            concurrency: concurrency.max(1),
            progress: Arc::new(GlobalProgress::new()),
            observer: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<GlobalProgress>, observer: Option<ProgressObserver>) -> Self {
        self.progress = progress;
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn worker_count(&self, batch_count: usize) -> usize {
        self.concurrency.min(batch_count)
    }

    /// 全バッチを処理し終えるまで待つ
    ///
    /// バッチの失敗は他のバッチを止めない。
    pub async fn run(&self, batches: Vec<Batch>) -> PoolReport {
        let batch_count = batches.len();
        let workers = self.worker_count(batch_count);
        let mut report = PoolReport {
            workers,
            ..Default::default()
        };
        if workers == 0 {
            return report;
        }

        let shared = Arc::new(SharedQueue {
            batches,
            cursor: AtomicUsize::new(0),
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            progress: Arc::clone(&self.progress),
            observer: self.observer.clone(),
            cancel: self.cancel.clone(),
        });

        let mut set = JoinSet::new();
        for worker in 0..workers {
            let shared = Arc::clone(&shared);
            set.spawn(async move { shared.work(worker).await });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => report.merge(outcome),
                Err(e) => tracing::error!("ワーカーが異常終了しました: {}", e),
            }
        }

        let processed = report.batches_succeeded + report.batches_unapplied + report.failures.len();
        report.batches_skipped = batch_count.saturating_sub(processed);
        report
    }
}

struct SharedQueue {
    batches: Vec<Batch>,
    cursor: AtomicUsize,
    backend: Arc<dyn TranslationBackend>,
    store: SharedStore,
    progress: Arc<GlobalProgress>,
    observer: Option<ProgressObserver>,
    cancel: CancellationToken,
}

impl SharedQueue {
    async fn work(&self, worker: usize) -> WorkerOutcome {
        let mut outcome = WorkerOutcome::default();

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!(worker, "キャンセルされたため終了");
                break;
            }
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(batch) = self.batches.get(index) else {
                break;
            };
            self.process(batch, &mut outcome).await;
        }

        outcome
    }

    async fn process(&self, batch: &Batch, outcome: &mut WorkerOutcome) {
        let prior = {
            let mut store = lock_store(&self.store);
            store.mark_translating(batch.file_id, &batch.ids())
        };

        match prior {
            Ok(prior) => {
                let result = self.backend.translate(batch).await;
                let mut store = lock_store(&self.store);
                match result {
                    Ok(map) => match store.apply_batch_result(batch.file_id, &prior, &map) {
                        Ok(applied) => {
                            tracing::debug!(
                                batch = batch.index,
                                applied,
                                requested = batch.len(),
                                "バッチ完了"
                            );
                            outcome.succeeded += 1;
                            outcome.translated += applied;
                        }
                        Err(e) => {
                            tracing::warn!(batch = batch.index, "結果を反映できません: {}", e);
                            outcome.unapplied += 1;
                        }
                    },
                    Err(err) => {
                        tracing::warn!(
                            batch = batch.index,
                            file = %batch.file_id,
                            "バッチ翻訳に失敗: {}",
                            err
                        );
                        if let Err(e) = store.restore_statuses(batch.file_id, &prior) {
                            // ファイルが消えていても失敗として数える
                            tracing::warn!(batch = batch.index, "状態を戻せません: {}", e);
                        }
                        outcome.failures.push(err);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(batch = batch.index, "バッチを開始できません: {}", e);
                outcome.unapplied += 1;
            }
        }

        outcome.attempted += batch.len();
        self.progress.advance_and_notify(batch.len(), self.observer.as_ref());
    }
}
