//! 読み込み → 編集 → 書き出しの統合テスト

use c4d_localizer::export::{self, DEFAULT_ARCHIVE_NAME};
use c4d_localizer::loader;
use c4d_localizer::store::DocumentStore;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;

const SOURCE: &str = "// C4D-StringResource\r\nSTRINGTABLE\r\n{\r\n  IDS_MATERIAL \"Material\";\r\n  IDS_GLOSS    \"Gloss\";   // comment\r\n  IDS_DONE \"\\u5b8c\\u6210\";\r\n}";

fn write_tree(root: &Path) {
    let en = root.join("res").join("strings_en-US");
    fs::create_dir_all(en.join("dialogs")).unwrap();
    fs::write(en.join("c4d_strings.str"), SOURCE).unwrap();
    fs::write(en.join("dialogs").join("main.res"), SOURCE).unwrap();
}

fn load_store(root: &Path) -> DocumentStore {
    let mut store = DocumentStore::new();
    store.add_files(loader::load_inputs(&[root.join("res")]).unwrap());
    store
}

#[test]
fn test_untouched_file_round_trips() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_tree(dir.path());
    let store = load_store(dir.path());
    let out = dir.path().join("out");

    let written = export::write_to_dir(&store.files_for_export(), &out).unwrap();
    assert_eq!(written.len(), 2);

    // 改行は \n に統一される以外は元のまま
    let content = fs::read_to_string(out.join("res/strings_cn/c4d_strings.str")).unwrap();
    assert_eq!(content, SOURCE.replace("\r\n", "\n"));
}

#[test]
fn test_manual_edit_is_exported() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_tree(dir.path());
    let mut store = load_store(dir.path());

    let file = &store.files()[0];
    assert_eq!(file.path, "res/strings_en-US/c4d_strings.str");
    let (file_id, gloss) = (
        file.id,
        file.entries.iter().find(|e| e.key == "IDS_GLOSS").unwrap().id,
    );
    store.update_entry(file_id, gloss, "光泽").unwrap();
    store.set_file_checked(file_id, true).unwrap();

    let out = dir.path().join("out");
    let written = export::write_to_dir(&store.files_for_export(), &out).unwrap();
    assert_eq!(written, vec![out.join("res/strings_cn/c4d_strings.str")]);

    let content = fs::read_to_string(&written[0]).unwrap();
    assert!(content.contains("  IDS_GLOSS    \"\\u5149\\u6cfd\";   // comment"));
    assert!(content.contains("  IDS_MATERIAL \"Material\";"));
    assert!(content.contains("  IDS_DONE \"\\u5b8c\\u6210\";"));
}

#[test]
fn test_zip_contains_all_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_tree(dir.path());
    let store = load_store(dir.path());
    let zip_path = dir.path().join(DEFAULT_ARCHIVE_NAME);

    export::write_zip(&store.files_for_export(), &zip_path).unwrap();

    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "res/strings_cn/c4d_strings.str",
            "res/strings_cn/dialogs/main.res"
        ]
    );

    let mut content = String::new();
    archive
        .by_name("res/strings_cn/dialogs/main.res")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert!(content.contains("IDS_MATERIAL"));
}
