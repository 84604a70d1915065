//! エラー型定義
//!
//! このクレートはI/Oを行わないため、失敗はAI応答の解釈だけ。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// 応答に `[...]` 配列もコードブロックも無い
    #[error("応答にJSONが見つかりません")]
    JsonNotFound,

    #[error("翻訳結果のJSONを解釈できません: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_not_found_message() {
        assert_eq!(Error::JsonNotFound.to_string(), "応答にJSONが見つかりません");
    }

    #[test]
    fn test_from_serde_json() {
        let json_error = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::InvalidJson(_)));
        assert!(error.to_string().starts_with("翻訳結果のJSON"));
    }
}
