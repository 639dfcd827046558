use super::CaseTracker;
use crate::client::{Clock, RateLimitOptions, RateLimitedClient, SystemClock};
use crate::identity::IdentityResolver;
use crate::inventory::{InventoryFetcher, DEFAULT_APPID};
use crate::price::PriceOracle;
use crate::settings::{Settings, SettingsProvider};
use crate::types::AppId;
use std::sync::Arc;

/// Builder for constructing a [`CaseTracker`].
#[derive(Debug)]
pub struct CaseTrackerBuilder {
    /// The settings source polled before identity and pricing operations.
    pub(crate) settings: Option<Arc<dyn SettingsProvider>>,
    /// Rate limit tuning. The defaults reflect observed Steam limits.
    pub(crate) rate_limit: RateLimitOptions,
    /// The clock driving spacing and quota bookkeeping. Tests substitute a fake.
    pub(crate) clock: Option<Arc<dyn Clock>>,
    /// The application whose inventories are tracked. Defaults to 730.
    pub(crate) appid: AppId,
}

impl Default for CaseTrackerBuilder {
    fn default() -> Self {
        Self {
            settings: None,
            rate_limit: RateLimitOptions::default(),
            clock: None,
            appid: DEFAULT_APPID,
        }
    }
}

impl CaseTrackerBuilder {
    /// Creates a new [`CaseTrackerBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings source. A plain [`Settings`] works for fixed configuration; implement
    /// [`SettingsProvider`] to serve live values from a settings store.
    pub fn settings<T>(mut self, settings: T) -> Self
    where
        T: SettingsProvider + 'static,
    {
        self.settings = Some(Arc::new(settings));
        self
    }

    /// Rate limit tuning for the shared client.
    pub fn rate_limit(mut self, options: RateLimitOptions) -> Self {
        self.rate_limit = options;
        self
    }

    /// The clock used for spacing and quota bookkeeping.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// The application whose inventories are tracked.
    pub fn appid(mut self, appid: AppId) -> Self {
        self.appid = appid;
        self
    }

    /// Builds the [`CaseTracker`].
    pub fn build(self) -> CaseTracker {
        let settings = self.settings
            .unwrap_or_else(|| Arc::new(Settings::default()));
        let clock = self.clock
            .unwrap_or_else(|| Arc::new(SystemClock));
        let client = Arc::new(RateLimitedClient::new(
            Arc::clone(&settings),
            self.rate_limit,
            clock,
        ));

        CaseTracker {
            resolver: IdentityResolver::new(Arc::clone(&client), Arc::clone(&settings)),
            fetcher: InventoryFetcher::new(Arc::clone(&client)),
            oracle: PriceOracle::new(client, Arc::clone(&settings)),
            settings,
            appid: self.appid,
        }
    }
}
