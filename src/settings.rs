//! Configuration supplied by the embedding application.

use crate::currency::Currency;

/// Browser identity strings used when no pool is configured.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// A snapshot of the settings the crate reads before identity and pricing operations.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Your account's API key from <https://steamcommunity.com/dev/apikey>. Required for vanity
    /// resolution and profile summaries; inventory and price requests work without one.
    pub api_key: Option<String>,
    /// The currency for market prices.
    pub currency: Currency,
    /// The base delay between outgoing requests in milliseconds. A random jitter is added on
    /// top of this so request timing carries no fixed period.
    pub request_delay_ms: u64,
    /// The pool of user agent strings to rotate through.
    pub user_agent_pool: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            currency: Currency::USD,
            request_delay_ms: 2500,
            user_agent_pool: DEFAULT_USER_AGENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Read-only source of [`Settings`]. The crate polls this before each identity or pricing
/// operation, so implementations backed by a settings store pick up changes without a restart.
pub trait SettingsProvider: Send + Sync + std::fmt::Debug {
    fn settings(&self) -> Settings;
}

impl SettingsProvider for Settings {
    fn settings(&self) -> Settings {
        self.clone()
    }
}
