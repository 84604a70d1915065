//! OpenAI互換API連携（DeepSeek等）

use super::{status_error, TranslationBackend};
use crate::error::{BackendError, BackendErrorKind};
use crate::translator::Batch;
use async_trait::async_trait;
use c4d_localizer_common::{
    build_translation_prompt, parse_translation_response, TranslationMap, SYSTEM_MESSAGE,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// ベースURLから chat/completions のURLを作る
///
/// 既に `/chat/completions` で終わっていればそのまま使う。
pub fn chat_completions_url(base_url: &str) -> String {
    if base_url.ends_with("/chat/completions") {
        return base_url.to_string();
    }
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, model: String) -> Self {
        Self {
            client,
            api_key,
            url: chat_completions_url(&base_url),
            model,
        }
    }

    fn build_request(&self, batch: &Batch) -> ChatRequest<'_> {
        let prompt = build_translation_prompt(&batch.prompt_items(), true);

        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            stream: false,
        }
    }
}

#[async_trait]
impl TranslationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate(&self, batch: &Batch) -> Result<TranslationMap, BackendError> {
        if batch.is_empty() {
            return Ok(TranslationMap::new());
        }

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(batch))
            .send()
            .await
            .map_err(|e| batch.error(BackendErrorKind::Network, e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(batch, response).await);
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| batch.error(BackendErrorKind::MalformedResponse, e.to_string()))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| batch.error(BackendErrorKind::MalformedResponse, "AIプロバイダから応答がありません"))?;

        // DeepSeekは ```json ... ``` で包むことがある
        parse_translation_response(content.trim())
            .map_err(|e| batch.error(BackendErrorKind::MalformedResponse, e.to_string()))
    }
}
