use crate::ai_provider::AiProvider;
use crate::error::{LocalizerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "C4D_LOCALIZER_API_KEY";

const DEFAULT_CONCURRENCY: usize = 5;
const DEFAULT_BATCH_SIZE: usize = 14;

/// AI設定（~/.config/c4d-localizer/config.json）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: AiProvider,
    pub api_key: Option<String>,
    /// OpenAI互換APIのベースURL（例: https://api.deepseek.com）
    pub base_url: String,
    pub model_name: String,
    /// 同時リクエスト数
    pub concurrency: usize,
    /// 1リクエストあたりの行数
    pub batch_size: usize,
    pub timeout_seconds: u64,
    /// 失敗バッチの再試行回数（0 = 再試行しない）
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            api_key: None,
            base_url: "https://api.deepseek.com".into(),
            model_name: AiProvider::Gemini.default_model().into(),
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_seconds: 120,
            max_retries: 0,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数のAPIキーで上書きする
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.api_key = Some(key);
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config.normalized())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LocalizerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("c4d-localizer").join("config.json"))
    }

    /// 0 の並列数・バッチサイズは既定値に戻す
    pub fn normalized(mut self) -> Self {
        if self.concurrency == 0 {
            self.concurrency = DEFAULT_CONCURRENCY;
        }
        if self.batch_size == 0 {
            self.batch_size = DEFAULT_BATCH_SIZE;
        }
        self
    }

    /// APIキー（空文字は未設定扱い）
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn require_api_key(&self) -> Result<String> {
        self.api_key().ok_or(LocalizerError::MissingApiKey)
    }

    /// 表示用にマスクしたAPIキー
    pub fn masked_api_key(&self) -> String {
        match self.api_key() {
            Some(key) if key.chars().count() > 8 => {
                let head: String = key.chars().take(4).collect();
                format!("{}****", head)
            }
            Some(_) => "****".into(),
            None => "未設定".into(),
        }
    }
}

/// 1回の翻訳実行で固定される設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub batch_size: usize,
    pub concurrency: usize,
}

impl RunConfig {
    pub fn new(batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.batch_size, config.concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, AiProvider::Gemini);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.batch_size, 14);
        assert_eq!(config.model_name, "gemini-2.5-flash");
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.batch_size, 14);
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"provider": "openai", "concurrency": 0, "batchSize": 3}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider, AiProvider::Openai);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.base_url, "https://api.deepseek.com");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            model_name: "deepseek-chat".into(),
            max_retries: 2,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.model_name, "deepseek-chat");
        assert_eq!(loaded.max_retries, 2);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
        assert!(matches!(config.require_api_key(), Err(LocalizerError::MissingApiKey)));
        assert_eq!(config.masked_api_key(), "未設定");
    }

    #[test]
    fn test_masked_api_key() {
        let config = Config {
            api_key: Some("sk-1234567890".into()),
            ..Default::default()
        };
        assert_eq!(config.masked_api_key(), "sk-1****");
    }

    #[test]
    fn test_run_config_clamps_to_one() {
        let run = RunConfig::new(0, 0);
        assert_eq!(run.batch_size, 1);
        assert_eq!(run.concurrency, 1);
    }
}
