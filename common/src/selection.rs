//! 翻訳対象の自動選択ルール

use crate::types::{EntryStatus, StringEntry};

/// CJK統合漢字（U+4E00〜U+9FA5）を含むか
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

/// 読み込み時の自動選択: 未翻訳で、英語らしく、空でない行
pub fn should_auto_select(entry: &StringEntry) -> bool {
    if entry.is_comment_or_empty || entry.status == EntryStatus::Done {
        return false;
    }
    !contains_cjk(&entry.value) && !entry.value.trim().is_empty()
}

/// スマート選択: 中国語を含まず、翻訳が空で、原文が空でない行
pub fn should_smart_select(entry: &StringEntry) -> bool {
    !entry.is_comment_or_empty
        && !contains_cjk(&entry.value)
        && entry.translated_value.is_empty()
        && !entry.value.trim().is_empty()
}

/// 読み込み直後のエントリ列に自動選択を適用
pub fn apply_auto_selection(entries: &mut [StringEntry]) {
    for entry in entries.iter_mut().filter(|e| !e.is_comment_or_empty) {
        if entry.status != EntryStatus::Done {
            entry.is_selected = should_auto_select(entry);
        }
    }
}
