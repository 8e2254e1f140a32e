//! Bounded retry around a single remote upload.

use std::time::{Duration, Instant};

use rand::Rng;
use utkrisht_core::UploadRetrySettings;
use utkrisht_storage::{MediaStore, StorageError, UploadDescriptor};

/// How uploads are retried: attempt budget, exponential backoff with jitter,
/// and a per-attempt deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&UploadRetrySettings::default())
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &UploadRetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.backoff_base_ms),
            max_jitter: Duration::from_millis(settings.backoff_jitter_ms),
            attempt_timeout: Duration::from_secs(settings.attempt_timeout_secs),
        }
    }

    /// Same attempt budget without any waiting between attempts.
    pub fn without_delays(self) -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            ..self
        }
    }

    /// Backoff before the retry that follows `attempt` (1-based), jitter excluded.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn jittered_backoff(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

/// Upload `data` into `folder`, retrying transient failures per `policy`.
///
/// Terminal failures return after the attempt that produced them; when the
/// budget runs out the last transient error is returned.
pub async fn upload_with_retry(
    store: &dyn MediaStore,
    policy: &RetryPolicy,
    data: &[u8],
    folder: &str,
) -> Result<UploadDescriptor, StorageError> {
    let mut attempt = 1;
    loop {
        let started = Instant::now();
        let result = match tokio::time::timeout(
            policy.attempt_timeout,
            store.upload(data.to_vec(), folder),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "upload attempt exceeded {}s",
                policy.attempt_timeout.as_secs()
            ))),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(descriptor) => {
                tracing::info!(
                    folder = %folder,
                    public_id = %descriptor.public_id,
                    size_bytes = data.len(),
                    attempt,
                    duration_ms,
                    "Uploaded to media store"
                );
                return Ok(descriptor);
            }
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.jittered_backoff(attempt);
                tracing::warn!(
                    folder = %folder,
                    size_bytes = data.len(),
                    attempt,
                    duration_ms,
                    delay_ms = delay.as_millis() as u64,
                    kind = err.kind().code(),
                    "Transient upload failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(
                    folder = %folder,
                    size_bytes = data.len(),
                    attempt,
                    duration_ms,
                    kind = err.kind().code(),
                    transient = err.is_transient(),
                    "Upload failed"
                );
                return Err(err);
            }
        }
    }
}
