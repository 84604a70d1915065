//! 選択行をバッチに分割する

use crate::error::{BackendError, BackendErrorKind};
use c4d_localizer_common::{EntryId, FileId, PromptItem};

/// 翻訳対象の1行（ID + 原文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub id: EntryId,
    pub text: String,
}

impl BatchItem {
    pub fn new(id: EntryId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// 1回のAPI呼び出しに載せる行のまとまり
#[derive(Debug, Clone)]
pub struct Batch {
    /// ファイル内での連番（0始まり）
    pub index: usize,
    pub file_id: FileId,
    pub items: Vec<BatchItem>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn prompt_items(&self) -> Vec<PromptItem<'_>> {
        self.items
            .iter()
            .map(|item| PromptItem {
                id: item.id.to_string(),
                text: &item.text,
            })
            .collect()
    }

    /// このバッチの失敗を作る
    pub fn error(&self, kind: BackendErrorKind, message: impl Into<String>) -> BackendError {
        BackendError::new(self.index, self.file_id, kind, message)
    }
}

/// 順序を保ったまま `batch_size` 件ずつに分割する
///
/// 最後のバッチだけは短くなりうる。空入力ならバッチは0個。
pub fn make_batches(file_id: FileId, items: Vec<BatchItem>, batch_size: usize) -> Vec<Batch> {
    let size = batch_size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();

    while iter.peek().is_some() {
        let chunk: Vec<BatchItem> = iter.by_ref().take(size).collect();
        batches.push(Batch {
            index: batches.len(),
            file_id,
            items: chunk,
        });
    }

    batches
}
