//! C4D文字列テーブル(.str/.res)のパース・再生成
//!
//! 1行 = `KEY "Value";`。キーとクォート外の書式は再生成時にそのまま残す。

use crate::selection::contains_cjk;
use crate::types::{EntryId, EntryStatus, StringEntry};
use crate::unicode::decode_unicode;
use regex::Regex;

lazy_static::lazy_static! {
    // 1: 前置部（キーを含む） 2: クォート内 3: 後置部（セミコロン・コメント）
    static ref C4D_STR_RE: Regex = Regex::new(r#"^(\s*[A-Z0-9_]+\s+)"(.*)"(\s*;\s*.*)$"#).unwrap();
}

/// ファイル内容を行ごとのエントリに変換
///
/// キー/値の形をしていない行はコメント扱い（翻訳対象外）になる。
/// 既に `\uXXXX` や中国語を含む値は翻訳済みとして読み込む。
pub fn parse_str_file(content: &str) -> Vec<StringEntry> {
    split_lines(content).map(parse_line).collect()
}

fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn parse_line(line: &str) -> StringEntry {
    let Some(caps) = C4D_STR_RE.captures(line) else {
        return StringEntry::comment(line);
    };

    let key = caps[1].trim().to_string();
    let raw_value = caps[2].to_string();
    let decoded = decode_unicode(&raw_value);
    let already_translated = decoded != raw_value || contains_cjk(&decoded);

    StringEntry {
        id: EntryId::next(),
        original_line: line.to_string(),
        key,
        translated_value: if already_translated { decoded } else { String::new() },
        unicode_value: if already_translated { raw_value.clone() } else { String::new() },
        value: raw_value,
        status: if already_translated {
            EntryStatus::Done
        } else {
            EntryStatus::Pending
        },
        is_comment_or_empty: false,
        is_selected: false,
    }
}

/// エントリ列からファイル内容を再生成
///
/// unicode_value が空なら原文を書き戻す。コメント行は元の行のまま。
pub fn generate_file_content(entries: &[StringEntry]) -> String {
    entries
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(entry: &StringEntry) -> String {
    if entry.is_comment_or_empty {
        return entry.original_line.clone();
    }

    match C4D_STR_RE.captures(&entry.original_line) {
        Some(caps) => {
            let content = if entry.unicode_value.is_empty() {
                &entry.value
            } else {
                &entry.unicode_value
            };
            format!("{}\"{}\"{}", &caps[1], content, &caps[3])
        }
        None => entry.original_line.clone(),
    }
}
