//! 読み込んだファイル群の保持と操作
//!
//! 翻訳中のワーカーと利用者操作が同じストアを触るため、
//! 共有時は `SharedStore`（`Arc<Mutex<_>>`）で包む。ロックは待機をまたいで保持しない。

use crate::error::{LocalizerError, Result};
use crate::translator::BatchItem;
use c4d_localizer_common::{
    should_smart_select, EntryId, EntryStatus, FileDocument, FileId, FileStatus, TranslationMap,
    TranslationStats,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type SharedStore = Arc<Mutex<DocumentStore>>;

/// ストアをロックする（パニックで汚染されていても中身は使う）
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, DocumentStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 翻訳実行の対象になるファイル
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    pub file_id: FileId,
    pub name: String,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    files: Vec<FileDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn add_file(&mut self, doc: FileDocument) -> FileId {
        let id = doc.id;
        self.files.push(doc);
        id
    }

    pub fn add_files(&mut self, docs: impl IntoIterator<Item = FileDocument>) -> Vec<FileId> {
        docs.into_iter().map(|doc| self.add_file(doc)).collect()
    }

    /// 読み込み順
    pub fn files(&self) -> &[FileDocument] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, id: FileId) -> Option<&FileDocument> {
        self.files.iter().find(|f| f.id == id)
    }

    fn file_mut(&mut self, id: FileId) -> Result<&mut FileDocument> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(LocalizerError::UnknownFile(id))
    }

    pub fn set_file_checked(&mut self, id: FileId, checked: bool) -> Result<()> {
        self.file_mut(id)?.is_checked = checked;
        Ok(())
    }

    pub fn set_file_status(&mut self, id: FileId, status: FileStatus) -> Result<()> {
        self.file_mut(id)?.status = status;
        Ok(())
    }

    /// 指定行の選択を切り替える。コメント・空行は対象外。変更した行数を返す
    pub fn set_selection(&mut self, file_id: FileId, ids: &[EntryId], selected: bool) -> Result<usize> {
        let file = self.file_mut(file_id)?;
        let mut changed = 0;
        for entry in file.entries.iter_mut().filter(|e| !e.is_comment_or_empty) {
            if ids.contains(&entry.id) && entry.is_selected != selected {
                entry.is_selected = selected;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// 未翻訳の英語行だけを選び直す。選択数を返す
    pub fn smart_select(&mut self, file_id: FileId) -> Result<usize> {
        let file = self.file_mut(file_id)?;
        for entry in file.entries.iter_mut() {
            entry.is_selected = should_smart_select(entry);
        }
        Ok(file.selected_count())
    }

    /// 全行を選択 / 全解除。選択数を返す
    pub fn select_all(&mut self, file_id: FileId, select: bool) -> Result<usize> {
        let file = self.file_mut(file_id)?;
        for entry in file.entries.iter_mut().filter(|e| !e.is_comment_or_empty) {
            entry.is_selected = select;
        }
        Ok(file.selected_count())
    }

    /// 手動で訳文を入力する（選択状態は変えない）
    pub fn update_entry(&mut self, file_id: FileId, entry_id: EntryId, text: &str) -> Result<()> {
        let file = self.file_mut(file_id)?;
        let entry = file
            .entry_mut(entry_id)
            .filter(|e| !e.is_comment_or_empty)
            .ok_or_else(|| LocalizerError::UnknownEntry(entry_id.to_string()))?;
        entry.set_translation(text);
        file.recompute_stats();
        Ok(())
    }

    /// 選択行を持つファイルを読み込み順で列挙
    pub fn selection_snapshot(&self) -> Vec<SelectionSnapshot> {
        self.files
            .iter()
            .filter(|f| f.selected_count() > 0)
            .map(|f| SelectionSnapshot {
                file_id: f.id,
                name: f.name.clone(),
                items: f
                    .selected_entries()
                    .map(|e| BatchItem::new(e.id, e.value.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn total_selected(&self) -> usize {
        self.files.iter().map(FileDocument::selected_count).sum()
    }

    /// バッチの行を翻訳中にし、元の状態を返す
    pub fn mark_translating(
        &mut self,
        file_id: FileId,
        ids: &[EntryId],
    ) -> Result<HashMap<EntryId, EntryStatus>> {
        let file = self.file_mut(file_id)?;
        let mut prior = HashMap::with_capacity(ids.len());
        for &id in ids {
            if let Some(entry) = file.entry_mut(id) {
                prior.insert(id, entry.status);
                entry.status = EntryStatus::Translating;
            }
        }
        Ok(prior)
    }

    /// バッチ結果を反映し、統計を再計算する。反映した行数を返す
    ///
    /// 応答にあるIDは訳文を入れて選択解除、無いIDは元の状態に戻す。
    /// バッチ外のIDは無視する。
    pub fn apply_batch_result(
        &mut self,
        file_id: FileId,
        prior: &HashMap<EntryId, EntryStatus>,
        results: &TranslationMap,
    ) -> Result<usize> {
        let file = self.file_mut(file_id)?;
        let mut applied = 0;
        for (&id, &status) in prior {
            let Some(entry) = file.entry_mut(id) else {
                continue;
            };
            match results.get(&id) {
                Some(text) => {
                    entry.set_translation(text);
                    entry.is_selected = false;
                    applied += 1;
                }
                None => entry.status = status,
            }
        }
        file.recompute_stats();
        Ok(applied)
    }

    /// 失敗したバッチの行を元の状態に戻す
    pub fn restore_statuses(&mut self, file_id: FileId, prior: &HashMap<EntryId, EntryStatus>) -> Result<()> {
        let file = self.file_mut(file_id)?;
        for (&id, &status) in prior {
            if let Some(entry) = file.entry_mut(id) {
                entry.status = status;
            }
        }
        Ok(())
    }

    /// チェック済みファイルを削除。チェックが無ければ全削除。削除数を返す
    pub fn remove_checked_or_all(&mut self) -> usize {
        let before = self.files.len();
        if self.files.iter().any(|f| f.is_checked) {
            self.files.retain(|f| !f.is_checked);
        } else {
            self.files.clear();
        }
        before - self.files.len()
    }

    /// 書き出し対象（チェック済み、無ければ全ファイル）
    pub fn files_for_export(&self) -> Vec<&FileDocument> {
        if self.files.iter().any(|f| f.is_checked) {
            self.files.iter().filter(|f| f.is_checked).collect()
        } else {
            self.files.iter().collect()
        }
    }

    pub fn global_stats(&self) -> TranslationStats {
        self.files
            .iter()
            .fold(TranslationStats::default(), |acc, f| acc + f.stats)
    }
}
