//! 翻訳結果の書き出し（フォルダ / ZIP）
//!
//! パス中の `strings_en*` は `strings_cn` に置き換える。

use crate::error::Result;
use c4d_localizer_common::{generate_file_content, FileDocument};
use regex::Regex;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "corona_c4d_translated.zip";

lazy_static::lazy_static! {
    static ref LOCALE_DIR_RE: Regex = Regex::new(r"strings_en[A-Za-z_-]*").unwrap();
}

/// 書き出し先の相対パス（区切りは `/`）
pub fn output_relative_path(doc: &FileDocument) -> String {
    let source = if doc.path.is_empty() { &doc.name } else { &doc.path };
    LOCALE_DIR_RE.replace(source, "strings_cn").into_owned()
}

/// フォルダに書き出す。書き出したパスを返す
pub fn write_to_dir(docs: &[&FileDocument], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(docs.len());

    for doc in docs {
        let target = out_dir.join(output_relative_path(doc));
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, generate_file_content(&doc.entries))?;
        tracing::debug!(path = %target.display(), "書き出し");
        written.push(target);
    }

    Ok(written)
}

/// 1ファイルだけのときの書き出し先（ディレクトリ構成は作らない）
pub fn single_target(doc: &FileDocument, out_dir: &Path) -> PathBuf {
    let relative = output_relative_path(doc);
    let file_name = relative.rsplit('/').next().unwrap_or(&relative);
    out_dir.join(file_name)
}

/// 1ファイルをそのまま書き出す
pub fn write_single(doc: &FileDocument, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let target = single_target(doc, out_dir);
    std::fs::write(&target, generate_file_content(&doc.entries))?;
    tracing::debug!(path = %target.display(), "書き出し");
    Ok(target)
}

/// 書き出し先に既に存在するファイル
pub fn existing_targets(docs: &[&FileDocument], out_dir: &Path) -> Vec<PathBuf> {
    docs.iter()
        .map(|doc| out_dir.join(output_relative_path(doc)))
        .filter(|p| p.exists())
        .collect()
}

/// ZIPアーカイブに書き出す
pub fn write_zip(docs: &[&FileDocument], zip_path: &Path) -> Result<()> {
    if let Some(parent) = zip_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for doc in docs {
        zip.start_file(output_relative_path(doc), options)?;
        zip.write_all(generate_file_content(&doc.entries).as_bytes())?;
    }

    zip.finish()?;
    tracing::info!(files = docs.len(), path = %zip_path.display(), "ZIPを作成しました");
    Ok(())
}
