//! 翻訳バックエンド
//!
//! オーケストレーションは `TranslationBackend` だけに依存する。
//! 実装は設定のプロバイダで選ぶ:
//! - Gemini: generateContent + レスポンススキーマ
//! - OpenAI互換: chat/completions（DeepSeek等）

mod gemini;
mod openai;
mod retry;

pub use gemini::{GeminiBackend, GEMINI_API_BASE};
pub use openai::{chat_completions_url, OpenAiBackend};
pub use retry::RetryingBackend;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{BackendError, BackendErrorKind, LocalizerError, Result};
use crate::translator::Batch;
use async_trait::async_trait;
use c4d_localizer_common::TranslationMap;
use std::sync::Arc;
use std::time::Duration;

/// バッチ翻訳の能力
///
/// 1バッチの (ID, 原文) を受け取り ID → 訳文 を返す。失敗時はバッチ全体が未適用になる。
/// 複数ワーカーから同時に呼ばれるため `Send + Sync` が必要。
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, batch: &Batch) -> std::result::Result<TranslationMap, BackendError>;
}

/// 設定からバックエンドを生成
pub fn create_backend(config: &Config) -> Result<Arc<dyn TranslationBackend>> {
    let api_key = config.require_api_key()?;
    let client = build_http_client(config.timeout_seconds)?;

    let model = if config.model_name.trim().is_empty() {
        config.provider.default_model().to_string()
    } else {
        config.model_name.clone()
    };

    let backend: Arc<dyn TranslationBackend> = match config.provider {
        AiProvider::Gemini => Arc::new(GeminiBackend::new(client, api_key, model)),
        AiProvider::Openai => Arc::new(OpenAiBackend::new(
            client,
            api_key,
            config.base_url.clone(),
            model,
        )),
    };

    if config.max_retries > 0 {
        Ok(Arc::new(RetryingBackend::new(backend, config.max_retries)))
    } else {
        Ok(backend)
    }
}

pub(crate) fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()
        .map_err(|e| LocalizerError::Config(format!("HTTPクライアント初期化エラー: {}", e)))
}

/// HTTPステータスを失敗分類に変換
pub(crate) fn classify_status(status: reqwest::StatusCode) -> BackendErrorKind {
    match status.as_u16() {
        401 | 403 => BackendErrorKind::Auth,
        429 => BackendErrorKind::RateLimit,
        code => BackendErrorKind::Api(code),
    }
}

/// 非2xx応答をバッチの失敗に変換
pub(crate) async fn status_error(batch: &Batch, response: reqwest::Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let preview: String = body.chars().take(300).collect();
    batch.error(classify_status(status), format!("HTTP {} - {}", status, preview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), BackendErrorKind::Auth);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), BackendErrorKind::Auth);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), BackendErrorKind::RateLimit);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), BackendErrorKind::Api(502));
    }

    #[test]
    fn test_create_backend_requires_api_key() {
        let config = Config::default();
        let result = create_backend(&config);
        assert!(matches!(result, Err(LocalizerError::MissingApiKey)));
    }

    #[test]
    fn test_create_backend_by_provider() {
        let mut config = Config {
            api_key: Some("key".into()),
            ..Default::default()
        };
        assert_eq!(create_backend(&config).unwrap().name(), "gemini");

        config.provider = AiProvider::Openai;
        assert_eq!(create_backend(&config).unwrap().name(), "openai");

        config.max_retries = 2;
        assert_eq!(create_backend(&config).unwrap().name(), "openai");
    }
}
