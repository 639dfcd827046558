use std::time::Duration;

/// Tuning for [`crate::client::RateLimitedClient`]. The defaults reflect observed Steam
/// limits; the base inter-request delay comes from [`crate::Settings`] instead so operators can
/// adjust it at runtime.
#[derive(Debug, Clone)]
pub struct RateLimitOptions {
    /// Width of the random jitter band added to the base request delay, in milliseconds.
    /// Randomizing the spacing avoids a detectable fixed-period request signature.
    pub jitter_band_ms: u64,
    /// Maximum number of inventory-class requests per rolling window. Steam tolerates roughly 5
    /// uncookied inventory requests per half hour before serving 429s.
    pub inventory_quota: u32,
    /// Length of the inventory quota window, in milliseconds.
    pub inventory_window_ms: u64,
    /// Safety margin added when suspending past the end of an exhausted quota window, in
    /// milliseconds.
    pub inventory_window_buffer_ms: u64,
    /// Base delay for exponential backoff after a 429, in milliseconds.
    pub backoff_base_ms: u64,
    /// Upper bound on a single backoff delay, in milliseconds.
    pub backoff_cap_ms: u64,
    /// Number of 429 retries per logical path before giving up with
    /// [`crate::Error::RateLimitExceeded`].
    pub max_retry_attempts: u32,
}

impl Default for RateLimitOptions {
    fn default() -> Self {
        Self {
            jitter_band_ms: 1500,
            inventory_quota: 5,
            inventory_window_ms: Duration::from_secs(30 * 60).as_millis() as u64,
            inventory_window_buffer_ms: 30_000,
            backoff_base_ms: 2_000,
            backoff_cap_ms: 60_000,
            max_retry_attempts: 5,
        }
    }
}
