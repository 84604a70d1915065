//! C4D Localizer Common Library
//!
//! CLIと各フロントエンドで共有される型と文字列テーブル変換

pub mod types;
pub mod error;
pub mod unicode;
pub mod str_file;
pub mod selection;
pub mod prompts;
pub mod parser;

pub use types::{EntryId, EntryStatus, FileDocument, FileId, FileStatus, StringEntry, TranslationStats};
pub use error::{Error, Result};
pub use unicode::{decode_unicode, to_unicode_escape};
pub use str_file::{generate_file_content, parse_str_file};
pub use selection::{apply_auto_selection, contains_cjk, should_auto_select, should_smart_select};
pub use prompts::{build_translation_prompt, PromptItem, SYSTEM_MESSAGE};
pub use parser::{extract_json, parse_translation_response, TranslationMap};
