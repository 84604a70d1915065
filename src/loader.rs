//! 入力パスから文字列テーブルを読み込む
//!
//! フォルダは再帰的に走査し、相対パス（フォルダ名を含む）を保持する。
//! 書き出し時にこの相対パスでディレクトリ構成を再現する。

use crate::error::{LocalizerError, Result};
use c4d_localizer_common::{apply_auto_selection, parse_str_file, FileDocument};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const STRING_TABLE_EXTENSIONS: &[&str] = &["str", "txt", "res"];

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// 入力ルートからの相対パス（区切りは `/`）
    pub relative_path: String,
    pub file_name: String,
}

pub fn is_string_table(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            STRING_TABLE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn to_source(path: &Path, root: &Path) -> SourceFile {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative_path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    SourceFile {
        path: path.to_path_buf(),
        relative_path,
        file_name,
    }
}

/// フォルダ配下の文字列テーブルを列挙（相対パス順）
pub fn scan_folder(folder: &Path) -> Result<Vec<SourceFile>> {
    if !folder.is_dir() {
        return Err(LocalizerError::FolderNotFound(folder.display().to_string()));
    }

    // 相対パスにフォルダ名自体を含める
    let root = folder.parent().unwrap_or(folder);

    let mut files: Vec<SourceFile> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_string_table(e.path()))
        .map(|e| to_source(e.path(), root))
        .collect();

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// ファイル・フォルダ混在の入力を展開
///
/// 個別指定のファイルも `.str` / `.txt` / `.res` 以外は読み飛ばす。
pub fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            sources.extend(scan_folder(input)?);
        } else if input.is_file() {
            if !is_string_table(input) {
                tracing::warn!(path = %input.display(), "文字列テーブルではないため読み飛ばします");
                continue;
            }
            let root = input.parent().unwrap_or(Path::new(""));
            sources.push(to_source(input, root));
        } else {
            return Err(LocalizerError::FileNotFound(input.display().to_string()));
        }
    }

    Ok(sources)
}

/// 1ファイルを読み込み、自動選択を適用
pub fn load_document(source: &SourceFile) -> Result<FileDocument> {
    let bytes = std::fs::read(&source.path)?;
    let content = String::from_utf8_lossy(&bytes);

    let mut entries = parse_str_file(&content);
    apply_auto_selection(&mut entries);

    Ok(FileDocument::new(
        source.file_name.clone(),
        source.relative_path.clone(),
        entries,
    ))
}

/// 入力をすべて読み込む（順序は入力順を保つ）
pub fn load_inputs(inputs: &[PathBuf]) -> Result<Vec<FileDocument>> {
    let sources = collect_sources(inputs)?;
    if sources.is_empty() {
        let names: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        return Err(LocalizerError::NoInputFiles(names.join(", ")));
    }

    let docs = sources
        .par_iter()
        .map(load_document)
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(files = docs.len(), "文字列テーブルを読み込みました");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_string_table() {
        assert!(is_string_table(Path::new("c4d_strings.str")));
        assert!(is_string_table(Path::new("dialog.RES")));
        assert!(is_string_table(Path::new("notes.txt")));
        assert!(!is_string_table(Path::new("icon.tif")));
        assert!(!is_string_table(Path::new("Makefile")));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(LocalizerError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_recursive() {
        let dir = tempdir().unwrap();
        let res = dir.path().join("res");
        fs::create_dir_all(res.join("strings_en-US").join("dialogs")).unwrap();
        fs::write(res.join("strings_en-US").join("c4d_strings.str"), "").unwrap();
        fs::write(res.join("strings_en-US").join("dialogs").join("main.res"), "").unwrap();
        fs::write(res.join("icon.tif"), "").unwrap();

        let files = scan_folder(&res).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "res/strings_en-US/c4d_strings.str",
                "res/strings_en-US/dialogs/main.res"
            ]
        );
        assert_eq!(files[0].file_name, "c4d_strings.str");
    }

    #[test]
    fn test_load_inputs_applies_auto_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c4d_strings.str");
        fs::write(
            &path,
            "STRINGTABLE\r\n{\r\n  IDS_A \"Diffuse\";\r\n  IDS_B \"\\u6f2b\\u53cd\\u5c04\";\r\n}\r\n",
        )
        .unwrap();

        let docs = load_inputs(&[path]).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "c4d_strings.str");
        assert_eq!(docs[0].selected_count(), 1);
        assert_eq!(docs[0].stats.total, 2);
        assert_eq!(docs[0].stats.translated, 1);
    }

    #[test]
    fn test_load_inputs_missing_path() {
        let result = load_inputs(&[PathBuf::from("/nonexistent/a.str")]);
        assert!(matches!(result, Err(LocalizerError::FileNotFound(_))));
    }

    #[test]
    fn test_load_inputs_skips_other_extensions() {
        let dir = tempdir().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "  IDS_A \"Diffuse\";\n").unwrap();

        let result = load_inputs(&[readme.clone()]);
        assert!(matches!(result, Err(LocalizerError::NoInputFiles(_))));

        let table = dir.path().join("c4d_strings.STR");
        fs::write(&table, "STRINGTABLE\n{\n  IDS_A \"Diffuse\";\n}").unwrap();
        let docs = load_inputs(&[readme, table]).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "c4d_strings.STR");
    }

    #[test]
    fn test_load_inputs_empty_folder() {
        let dir = tempdir().unwrap();
        let result = load_inputs(&[dir.path().to_path_buf()]);
        assert!(matches!(result, Err(LocalizerError::NoInputFiles(_))));
    }
}
