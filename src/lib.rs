//! Cinema 4D 文字列テーブル(.str/.res)のAI一括翻訳
//!
//! 読み込み → 選択 → バッチ並列翻訳 → 書き出し。
//! 行の解析・変換は `c4d-localizer-common` にある。

pub mod ai_provider;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod review;
pub mod store;
pub mod translator;
