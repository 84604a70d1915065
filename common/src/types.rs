//! 文字列テーブルの型定義
//!
//! CLIと各フロントエンドで共有される型:
//! - StringEntry: ソースファイルの1行
//! - FileDocument: 読み込まれた1ファイル（行順を保持）
//! - TranslationStats: ファイル単位の派生統計

use crate::unicode::to_unicode_escape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// エントリID（プロセス内で一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn next() -> Self {
        Self(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// ファイルID（プロセス内で一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    pub fn next() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// エントリの翻訳状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Translating,
    Done,
    Error,
}

/// ファイルの処理状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Idle,
    Processing,
    Completed,
}

/// ソースファイルの1行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringEntry {
    pub id: EntryId,
    /// 元の行（改行なし）
    pub original_line: String,
    /// 抽出したキー（例: IDS_MATERIAL）。コメント行は空
    pub key: String,
    /// 引用符内の原文。コメント行は空
    pub value: String,
    pub translated_value: String,
    /// translated_value の \uXXXX 表現
    pub unicode_value: String,
    pub status: EntryStatus,
    pub is_comment_or_empty: bool,
    pub is_selected: bool,
}

impl StringEntry {
    /// 翻訳対象外の行（コメント・空行・不正行）
    pub fn comment(line: &str) -> Self {
        Self {
            id: EntryId::next(),
            original_line: line.to_string(),
            key: String::new(),
            value: String::new(),
            translated_value: String::new(),
            unicode_value: String::new(),
            status: EntryStatus::Done,
            is_comment_or_empty: true,
            is_selected: false,
        }
    }

    pub fn is_translated(&self) -> bool {
        !self.translated_value.is_empty()
    }

    /// 翻訳値を設定（unicode_value と status も同時に更新）
    pub fn set_translation(&mut self, text: &str) {
        self.translated_value = text.to_string();
        self.unicode_value = to_unicode_escape(text);
        self.status = EntryStatus::Done;
    }
}

/// ファイル単位の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    /// 翻訳対象行数
    pub total: usize,
    /// 翻訳済み行数
    pub translated: usize,
    /// 原文の文字数合計
    pub chars: usize,
}

impl TranslationStats {
    /// エントリ列から統計を再計算する
    pub fn from_entries(entries: &[StringEntry]) -> Self {
        entries
            .iter()
            .filter(|e| !e.is_comment_or_empty)
            .fold(Self::default(), |acc, e| Self {
                total: acc.total + 1,
                translated: acc.translated + usize::from(e.is_translated()),
                chars: acc.chars + e.value.chars().count(),
            })
    }

    pub fn is_complete(&self) -> bool {
        self.translated >= self.total
    }
}

impl std::ops::Add for TranslationStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total: self.total + rhs.total,
            translated: self.translated + rhs.translated,
            chars: self.chars + rhs.chars,
        }
    }
}

/// 読み込まれた1ファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    pub id: FileId,
    /// ファイル名
    pub name: String,
    /// 入力ルートからの相対パス
    pub path: String,
    /// 行順（シリアライズ時に必須）
    pub entries: Vec<StringEntry>,
    pub stats: TranslationStats,
    pub status: FileStatus,
    /// エクスポート・削除対象のチェック
    pub is_checked: bool,
}

impl FileDocument {
    pub fn new(name: impl Into<String>, path: impl Into<String>, entries: Vec<StringEntry>) -> Self {
        let stats = TranslationStats::from_entries(&entries);
        Self {
            id: FileId::next(),
            name: name.into(),
            path: path.into(),
            entries,
            stats,
            status: FileStatus::Idle,
            is_checked: false,
        }
    }

    /// 統計を全エントリから再計算（差分更新はしない）
    pub fn recompute_stats(&mut self) {
        self.stats = TranslationStats::from_entries(&self.entries);
    }

    /// 選択済みの翻訳対象エントリ（行順）
    pub fn selected_entries(&self) -> impl Iterator<Item = &StringEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_selected && !e.is_comment_or_empty)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_entries().count()
    }

    pub fn entry(&self, id: EntryId) -> Option<&StringEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut StringEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}
