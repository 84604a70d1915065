//! Gemini API連携
//!
//! responseSchema で `[{id, translatedText}]` 形式のJSONを強制する。

use super::{status_error, TranslationBackend};
use crate::error::{BackendError, BackendErrorKind};
use crate::translator::Batch;
use async_trait::async_trait;
use c4d_localizer_common::{build_translation_prompt, parse_translation_response, TranslationMap};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// 接続先を差し替える（テスト・プロキシ用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(batch: &Batch) -> GeminiRequest {
        let prompt = build_translation_prompt(&batch.prompt_items(), false);

        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: json!({
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "id": { "type": "STRING" },
                            "translatedText": { "type": "STRING" }
                        },
                        "required": ["id", "translatedText"]
                    }
                }),
            },
        }
    }
}

#[async_trait]
impl TranslationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn translate(&self, batch: &Batch) -> Result<TranslationMap, BackendError> {
        if batch.is_empty() {
            return Ok(TranslationMap::new());
        }

        let request = Self::build_request(batch);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| batch.error(BackendErrorKind::Network, e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(batch, response).await);
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| batch.error(BackendErrorKind::MalformedResponse, e.to_string()))?;

        let text = payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| batch.error(BackendErrorKind::MalformedResponse, "Empty response from AI"))?;

        parse_translation_response(text)
            .map_err(|e| batch.error(BackendErrorKind::MalformedResponse, e.to_string()))
    }
}
