use std::time::Duration;

/// Maximum characters per chunk. Japanese runs one to two tokens per
/// character, so this leaves headroom under the model's input limit.
pub const DEFAULT_CHUNK_CHARS: usize = 8000;

/// Concurrent generation calls per invocation. Kept small to respect the
/// generation service's own rate limits.
pub const DEFAULT_WORKER_LIMIT: usize = 3;

/// Retry behavior for transient chunk-call failures.
///
/// Consumed by the orchestrator; the generation adapter itself never
/// retries. Delay for attempt `n` (1-based) is `base_delay * 2^(n-1)`,
/// plus up to 50% random jitter when `jitter` is set.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retrying after the given failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self.base_delay.saturating_mul(1u32 << exp);
        if self.jitter {
            let factor = 1.0 + rand::random::<f64>() * 0.5;
            base.mul_f64(factor)
        } else {
            base
        }
    }
}

/// Tunables for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Character budget per chunk.
    pub max_chunk_chars: usize,
    /// Bounded worker count for concurrent chunk summarization.
    pub worker_limit: usize,
    /// Timeout for a single generation call.
    pub call_timeout: Duration,
    /// Wall-clock bound for the whole invocation, independent of
    /// per-call timeouts.
    pub overall_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_CHUNK_CHARS,
            worker_limit: DEFAULT_WORKER_LIMIT,
            call_timeout: Duration::from_secs(60),
            overall_timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `VIDIGEST_CHUNK_CHARS`      | `8000`  |
    /// | `VIDIGEST_WORKER_LIMIT`     | `3`     |
    /// | `VIDIGEST_CALL_TIMEOUT_SECS`| `60`    |
    /// | `VIDIGEST_TIMEOUT_SECS`     | `300`   |
    /// | `VIDIGEST_MAX_RETRIES`      | `3`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_chunk_chars: env_parse("VIDIGEST_CHUNK_CHARS", defaults.max_chunk_chars),
            worker_limit: env_parse("VIDIGEST_WORKER_LIMIT", defaults.worker_limit),
            call_timeout: Duration::from_secs(env_parse(
                "VIDIGEST_CALL_TIMEOUT_SECS",
                defaults.call_timeout.as_secs(),
            )),
            overall_timeout: Duration::from_secs(env_parse(
                "VIDIGEST_TIMEOUT_SECS",
                defaults.overall_timeout.as_secs(),
            )),
            retry: RetryPolicy {
                max_attempts: env_parse("VIDIGEST_MAX_RETRIES", defaults.retry.max_attempts),
                ..defaults.retry
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
