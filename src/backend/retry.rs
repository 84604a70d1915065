//! 有限回の再試行ラッパー
//!
//! ネットワーク・レート制限・5xx のみ再試行する。認証エラーや壊れた応答は即失敗。

use super::TranslationBackend;
use crate::error::BackendError;
use crate::translator::Batch;
use async_trait::async_trait;
use c4d_localizer_common::TranslationMap;
use std::sync::Arc;
use std::time::Duration;

const BASE_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 30_000;

pub struct RetryingBackend {
    inner: Arc<dyn TranslationBackend>,
    max_retries: u32,
    base_backoff: Duration,
}

impl RetryingBackend {
    pub fn new(inner: Arc<dyn TranslationBackend>, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff: Duration::from_millis(BASE_BACKOFF_MS),
        }
    }

    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff
            .saturating_mul(factor)
            .min(Duration::from_millis(MAX_BACKOFF_MS))
    }
}

#[async_trait]
impl TranslationBackend for RetryingBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn translate(&self, batch: &Batch) -> Result<TranslationMap, BackendError> {
        let mut attempt = 0;
        loop {
            match self.inner.translate(batch).await {
                Ok(map) => return Ok(map),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    tracing::debug!(
                        batch = batch.index,
                        attempt = attempt + 1,
                        kind = %err.kind,
                        "{:?}後にバッチを再試行",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
