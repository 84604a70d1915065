use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    /// OpenAI互換API（DeepSeek等）
    Openai,
}

impl AiProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "Gemini",
            AiProvider::Openai => "OpenAI互換",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-2.5-flash",
            AiProvider::Openai => "deepseek-chat",
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::Gemini => write!(f, "gemini"),
            AiProvider::Openai => write!(f, "openai"),
        }
    }
}
