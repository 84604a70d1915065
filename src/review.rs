//! 未翻訳行の対話式入力

use crate::error::{LocalizerError, Result};
use crate::store::{lock_store, SharedStore};
use c4d_localizer_common::{EntryId, FileDocument, FileId};
use dialoguer::Input;

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// 訳文を入力
    Translate(String),
    /// この行をスキップ
    Skip,
    /// このファイルの残りをスキップ
    SkipFile,
    /// 終了
    Quit,
}

impl ReviewAction {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | "s" => Self::Skip,
            "S" => Self::SkipFile,
            "q" | "Q" => Self::Quit,
            text => Self::Translate(text.to_string()),
        }
    }
}

/// 訳文が空の翻訳対象行
pub fn untranslated_entries(doc: &FileDocument) -> Vec<EntryId> {
    doc.entries
        .iter()
        .filter(|e| !e.is_comment_or_empty && !e.is_translated())
        .map(|e| e.id)
        .collect()
}

/// 未翻訳行を1行ずつ入力する。入力した行数を返す
pub fn run_interactive_review(store: &SharedStore) -> Result<usize> {
    let targets: Vec<(FileId, String, Vec<EntryId>)> = lock_store(store)
        .files()
        .iter()
        .map(|f| (f.id, f.path.clone(), untranslated_entries(f)))
        .filter(|(_, _, ids)| !ids.is_empty())
        .collect();

    let total: usize = targets.iter().map(|(_, _, ids)| ids.len()).sum();
    if total == 0 {
        println!("✓ すべての行が翻訳済みです");
        return Ok(0);
    }

    println!("📝 未翻訳の行: {}件", total);
    println!("操作: [文字入力]訳文 [Enter/s]スキップ [S]ファイル残りスキップ [q]終了");
    println!("---\n");

    let mut updated = 0;

    'files: for (file_id, path, ids) in targets {
        println!("📄 {}", path);

        for (count, id) in ids.iter().enumerate() {
            let (key, value) = {
                let store = lock_store(store);
                match store.file(file_id).and_then(|f| f.entry(*id)) {
                    Some(e) => (e.key.clone(), e.value.clone()),
                    None => continue,
                }
            };
            println!("[{}/{}] {} \"{}\"", count + 1, ids.len(), key, value);

            let input: String = Input::new()
                .with_prompt("訳文")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| LocalizerError::Prompt(e.to_string()))?;

            match ReviewAction::parse(&input) {
                ReviewAction::Translate(text) => {
                    lock_store(store).update_entry(file_id, *id, &text)?;
                    updated += 1;
                    println!("  → {}\n", text);
                }
                ReviewAction::Skip => println!("  → スキップ\n"),
                ReviewAction::SkipFile => {
                    println!("  → このファイルの残りをスキップ\n");
                    continue 'files;
                }
                ReviewAction::Quit => break 'files,
            }
        }
    }

    Ok(updated)
}
