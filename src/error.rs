use c4d_localizer_common::FileId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalizerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`c4d-localizer config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("翻訳対象が選択されていません。翻訳する行を選択してください")]
    NoSelectedEntries,

    #[error("翻訳処理が既に実行中です")]
    AlreadyRunning,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("翻訳対象ファイル(.str/.txt/.res)が見つかりません: {0}")]
    NoInputFiles(String),

    #[error("ファイルが読み込まれていません: {0}")]
    UnknownFile(FileId),

    #[error("行が見つかりません: {0}")]
    UnknownEntry(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP生成エラー: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] c4d_localizer_common::Error),
}

impl LocalizerError {
    /// 実行前チェックで弾かれたエラー（状態は変更されていない）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LocalizerError::MissingApiKey
                | LocalizerError::NoSelectedEntries
                | LocalizerError::AlreadyRunning
        )
    }
}

/// バックエンド失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// 接続・タイムアウト
    Network,
    /// 401/403
    Auth,
    /// 429
    RateLimit,
    /// 応答を解釈できない
    MalformedResponse,
    /// その他のHTTPエラー
    Api(u16),
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Network => write!(f, "network"),
            BackendErrorKind::Auth => write!(f, "auth"),
            BackendErrorKind::RateLimit => write!(f, "rate-limit"),
            BackendErrorKind::MalformedResponse => write!(f, "malformed-response"),
            BackendErrorKind::Api(status) => write!(f, "api({})", status),
        }
    }
}

/// 1バッチの翻訳失敗
#[derive(Error, Debug, Clone)]
#[error("バッチ{batch_index} ({file_id}) の翻訳に失敗 [{kind}]: {message}")]
pub struct BackendError {
    pub batch_index: usize,
    pub file_id: FileId,
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(batch_index: usize, file_id: FileId, kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            batch_index,
            file_id,
            kind,
            message: message.into(),
        }
    }

    /// 再試行で回復しうるか
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            BackendErrorKind::Network | BackendErrorKind::RateLimit => true,
            BackendErrorKind::Api(status) => status >= 500,
            BackendErrorKind::Auth | BackendErrorKind::MalformedResponse => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalizerError>;
