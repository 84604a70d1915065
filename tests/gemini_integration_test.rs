use c4d_localizer::backend::{GeminiBackend, TranslationBackend};
use c4d_localizer::translator::{make_batches, BatchItem};
use c4d_localizer_common::{contains_cjk, EntryId, FileId};

#[tokio::test]
async fn gemini_translate_integration() {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            return;
        }
    };

    let items = vec![
        BatchItem::new(EntryId::from(1), "Diffuse Color"),
        BatchItem::new(EntryId::from(2), "Corona Light Material"),
    ];
    let batch = make_batches(FileId::next(), items, 14).pop().expect("one batch");

    let backend = GeminiBackend::new(reqwest::Client::new(), api_key, "gemini-2.5-flash".into());
    let map = backend.translate(&batch).await.expect("gemini request failed");

    assert_eq!(map.len(), 2);
    assert!(contains_cjk(&map[&EntryId::from(1)]));
    assert!(map[&EntryId::from(2)].contains("Corona"));
}
