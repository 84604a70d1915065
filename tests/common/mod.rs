//! 統合テスト用の共通ヘルパー

#![allow(dead_code)]

use async_trait::async_trait;
use c4d_localizer::backend::TranslationBackend;
use c4d_localizer::config::Config;
use c4d_localizer::error::{BackendError, BackendErrorKind};
use c4d_localizer::store::{lock_store, DocumentStore, SharedStore};
use c4d_localizer::translator::Batch;
use c4d_localizer_common::{apply_auto_selection, parse_str_file, EntryId, FileDocument, FileId, TranslationMap};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 台本どおりに応答するバックエンド
///
/// 既定では全IDに `<原文>-zh` を返す。
#[derive(Default)]
pub struct ScriptedBackend {
    /// 失敗させるバッチ番号
    pub fail_batches: HashSet<usize>,
    /// 応答から落とすID
    pub drop_ids: HashSet<EntryId>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub seen_batch_sizes: Mutex<Vec<usize>>,
    pub seen_files: Mutex<Vec<FileId>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(batches: &[usize]) -> Self {
        Self {
            fail_batches: batches.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn translate(&self, batch: &Batch) -> Result<TranslationMap, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_batch_sizes.lock().unwrap().push(batch.len());
        self.seen_files.lock().unwrap().push(batch.file_id);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_batches.contains(&batch.index) {
            return Err(batch.error(BackendErrorKind::Network, "connection reset"));
        }

        Ok(batch
            .items
            .iter()
            .filter(|item| !self.drop_ids.contains(&item.id))
            .map(|item| (item.id, format!("{}-zh", item.text)))
            .collect())
    }
}

/// 最初の呼び出しで指定ファイルをストアから削除するバックエンド
pub struct RemovingBackend {
    pub inner: ScriptedBackend,
    store: SharedStore,
    target: FileId,
    removed: AtomicBool,
}

impl RemovingBackend {
    pub fn new(store: SharedStore, target: FileId) -> Self {
        Self {
            inner: ScriptedBackend::new(),
            store,
            target,
            removed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TranslationBackend for RemovingBackend {
    fn name(&self) -> &str {
        "removing"
    }

    async fn translate(&self, batch: &Batch) -> Result<TranslationMap, BackendError> {
        if !self.removed.swap(true, Ordering::SeqCst) {
            let mut store = lock_store(&self.store);
            store.set_file_checked(self.target, true).unwrap();
            assert_eq!(store.remove_checked_or_all(), 1);
        }
        self.inner.translate(batch).await
    }
}

/// 翻訳対象 `n` 行のファイル
pub fn str_file(n: usize) -> String {
    let mut lines = vec!["STRINGTABLE".to_string(), "{".to_string()];
    for i in 0..n {
        lines.push(format!("  IDS_ITEM_{} \"Item {}\";", i, i));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

pub fn document(name: &str, content: &str) -> FileDocument {
    let mut entries = parse_str_file(content);
    apply_auto_selection(&mut entries);
    FileDocument::new(name, format!("res/strings_en-US/{}", name), entries)
}

pub fn shared_store(docs: Vec<FileDocument>) -> SharedStore {
    let mut store = DocumentStore::new();
    store.add_files(docs);
    store.into_shared()
}

pub fn config_with_key(batch_size: usize, concurrency: usize) -> Config {
    Config {
        api_key: Some("test-key".into()),
        batch_size,
        concurrency,
        ..Default::default()
    }
}
