//! 翻訳実行の制御
//!
//! 前提条件の確認 → 進捗の母数を固定 → ファイルを読み込み順に1つずつ処理。
//! ファイル内のバッチだけを並列に流す。

use super::batcher::make_batches;
use super::progress::{GlobalProgress, ProgressObserver, ProgressSnapshot};
use super::worker_pool::{PoolReport, WorkerPool};
use crate::backend::{create_backend, TranslationBackend};
use crate::config::{Config, RunConfig};
use crate::error::{BackendError, LocalizerError, Result};
use crate::store::{lock_store, SharedStore};
use c4d_localizer_common::{FileId, FileStatus};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// ファイル1つ分の結果
#[derive(Debug)]
pub struct FileRunReport {
    pub file_id: FileId,
    pub name: String,
    pub batches: usize,
    pub workers: usize,
    pub entries_attempted: usize,
    pub entries_translated: usize,
    pub batches_skipped: usize,
    pub batches_unapplied: usize,
    pub failures: Vec<BackendError>,
}

impl FileRunReport {
    fn new(file_id: FileId, name: String, batches: usize, pool: PoolReport) -> Self {
        Self {
            file_id,
            name,
            batches,
            workers: pool.workers,
            entries_attempted: pool.entries_attempted,
            entries_translated: pool.entries_translated,
            batches_skipped: pool.batches_skipped,
            batches_unapplied: pool.batches_unapplied,
            failures: pool.failures,
        }
    }
}

/// 1回の翻訳実行の結果
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub files: Vec<FileRunReport>,
    pub progress: ProgressSnapshot,
    pub cancelled: bool,
}

impl RunReport {
    pub fn translated(&self) -> usize {
        self.files.iter().map(|f| f.entries_translated).sum()
    }

    pub fn failed_batches(&self) -> usize {
        self.files.iter().map(|f| f.failures.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BackendError> {
        self.files.iter().flat_map(|f| f.failures.iter())
    }
}

/// 実行中フラグを抜けるときに必ず戻す
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    store: SharedStore,
    running: AtomicBool,
    progress: Arc<GlobalProgress>,
    observer: Option<ProgressObserver>,
    cancel: Mutex<CancellationToken>,
}

impl Orchestrator {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            running: AtomicBool::new(false),
            progress: Arc::new(GlobalProgress::new()),
            observer: None,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn state(&self) -> RunState {
        if self.running.load(Ordering::SeqCst) {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// 実行中の翻訳を止める
    ///
    /// 処理中のバッチは最後まで反映され、未着手のバッチは送信されない。
    pub fn cancel(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// 設定からバックエンドを作って実行
    pub async fn run(&self, config: &Config) -> Result<RunReport> {
        let backend = create_backend(config)?;
        self.start_translation(config, backend).await
    }

    /// 選択行をすべて翻訳する
    ///
    /// 前提条件（APIキー・実行中でない・選択行あり）を満たさなければ何も変更せずに返す。
    pub async fn start_translation(
        &self,
        config: &Config,
        backend: Arc<dyn TranslationBackend>,
    ) -> Result<RunReport> {
        config.require_api_key()?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LocalizerError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let run = RunConfig::from_config(config);
        let work = lock_store(&self.store).selection_snapshot();
        if work.is_empty() {
            return Err(LocalizerError::NoSelectedEntries);
        }

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();

        let total: usize = work.iter().map(|w| w.items.len()).sum();
        let started_at = Local::now();
        let clock = Instant::now();
        self.progress.reset_and_notify(total, self.observer.as_ref());

        tracing::info!(
            backend = backend.name(),
            files = work.len(),
            total,
            batch_size = run.batch_size,
            concurrency = run.concurrency,
            "翻訳開始"
        );

        let mut files = Vec::with_capacity(work.len());
        let mut cancelled = false;

        for snapshot in work {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            let file_id = snapshot.file_id;
            let count = snapshot.items.len();
            let started = lock_store(&self.store).set_file_status(file_id, FileStatus::Processing);
            if let Err(e) = started {
                // 実行中に削除されたファイルは飛ばす
                tracing::warn!(file = %snapshot.name, "スキップ: {}", e);
                self.progress.advance_and_notify(count, self.observer.as_ref());
                continue;
            }

            let batches = make_batches(file_id, snapshot.items, run.batch_size);
            let batch_count = batches.len();
            tracing::info!(file = %snapshot.name, entries = count, batches = batch_count, "ファイル処理開始");

            let pool = WorkerPool::new(Arc::clone(&backend), Arc::clone(&self.store), run.concurrency)
                .with_progress(Arc::clone(&self.progress), self.observer.clone())
                .with_cancellation(token.clone());
            let pool_report = pool.run(batches).await;

            if let Err(e) = lock_store(&self.store).set_file_status(file_id, FileStatus::Completed) {
                tracing::warn!(file = %snapshot.name, "{}", e);
            }
            if !pool_report.failures.is_empty() {
                tracing::warn!(
                    file = %snapshot.name,
                    failed = pool_report.failures.len(),
                    "一部のバッチが失敗しました"
                );
            }

            files.push(FileRunReport::new(file_id, snapshot.name, batch_count, pool_report));
        }

        let cancelled = cancelled || token.is_cancelled();
        let report = RunReport {
            started_at,
            elapsed: clock.elapsed(),
            files,
            progress: self.progress.snapshot(),
            cancelled,
        };

        tracing::info!(
            translated = report.translated(),
            failed_batches = report.failed_batches(),
            cancelled,
            "翻訳終了 ({:.1}秒)",
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }
}
