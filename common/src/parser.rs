//! APIレスポンスパーサー
//!
//! LLMの応答テキストからJSON配列を抽出し、ID → 訳文のマップにする

use crate::error::{Error, Result};
use crate::types::EntryId;
use serde::Deserialize;
use std::collections::HashMap;

/// ID → 訳文
pub type TranslationMap = HashMap<EntryId, String>;

/// 応答中のIDは文字列でも数値でも受け付ける
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedItem {
    id: RawId,
    translated_text: String,
}

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック（言語指定なしの ``` も可）
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use c4d_localizer_common::extract_json;
///
/// let response = "[{\"id\": \"1\", \"translatedText\": \"漫反射\"}]";
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("translatedText"));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    for marker in ["```json", "```"] {
        if let Some(start_marker) = response.find(marker) {
            let start = start_marker + marker.len();
            if let Some(end_offset) = response[start..].find("```") {
                let block = response[start..start + end_offset].trim();
                if block.starts_with('[') {
                    return Ok(block);
                }
            }
        }
    }

    if let Some(start) = response.find('[') {
        if let Some(end) = response.rfind(']') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::JsonNotFound)
}

/// 翻訳レスポンスをパース
///
/// `[{"id": "...", "translatedText": "..."}]` 形式。
/// 数値に変換できないIDの要素は結果に含めない。
pub fn parse_translation_response(response: &str) -> Result<TranslationMap> {
    let json_str = extract_json(response)?;
    let items: Vec<TranslatedItem> = serde_json::from_str(json_str.trim())?;

    let map = items
        .into_iter()
        .filter_map(|item| {
            let id = match item.id {
                RawId::Text(s) => s.parse::<EntryId>().ok()?,
                RawId::Number(n) => EntryId::from(n),
            };
            Some((id, item.translated_text))
        })
        .collect();

    Ok(map)
}
