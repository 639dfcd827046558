//! Ties the components together for refresh operations.

mod builder;

pub use builder::CaseTrackerBuilder;

use crate::error::Error;
use crate::identity::{IdentityResolver, ProfileInfo};
use crate::inventory::{CaseItem, InventoryFetcher};
use crate::price::PriceOracle;
use crate::settings::SettingsProvider;
use crate::steam_id::SteamId;
use crate::types::{AppId, OwnerId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The result of refreshing a single account.
#[derive(Debug, Clone)]
pub struct AccountRefresh {
    /// The canonical identifier the account resolved to.
    pub steam_id: SteamId,
    /// Profile metadata, when it could be fetched.
    pub profile: Option<ProfileInfo>,
    /// Whether the inventory turned out to be private.
    pub inventory_private: bool,
    /// The cases found, priced where a price was available.
    pub cases: Vec<CaseItem>,
    /// Number of distinct items that received a price.
    pub items_priced: usize,
    /// Number of distinct items with no price available.
    pub items_unpriced: usize,
}

/// Per-account and per-item counts for a batch refresh. Batch refreshes report these instead
/// of a single pass/fail verdict - partial progress is the normal case.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub accounts_refreshed: usize,
    pub accounts_failed: usize,
    pub items_priced: usize,
    pub items_unpriced: usize,
    /// Each account's result in input order.
    pub results: Vec<(OwnerId, Result<AccountRefresh, Error>)>,
}

/// Coordinates identity resolution, inventory fetching, and pricing over one shared
/// rate-limited client. Construct with [`CaseTracker::builder`].
///
/// Refresh operations run sequentially; see [`crate::client::RateLimitedClient`] for why they
/// must not overlap.
#[derive(Debug)]
pub struct CaseTracker {
    pub(crate) settings: Arc<dyn SettingsProvider>,
    pub(crate) resolver: IdentityResolver,
    pub(crate) fetcher: InventoryFetcher,
    pub(crate) oracle: PriceOracle,
    pub(crate) appid: AppId,
}

impl CaseTracker {
    pub fn builder() -> CaseTrackerBuilder {
        CaseTrackerBuilder::new()
    }

    /// Refreshes one account: resolves the identity, fetches its profile and cases, and prices
    /// each distinct item once.
    ///
    /// Identity failures propagate - the caller decides whether to abort or skip. Profile,
    /// inventory, and price failures degrade into the returned record after being logged.
    pub async fn refresh_account(
        &self,
        owner_id: OwnerId,
        identifier: &str,
    ) -> Result<AccountRefresh, Error> {
        let steam_id = self.resolver.resolve(identifier).await?;
        let profile = self.resolver.fetch_profile(&steam_id).await;
        let outcome = self.fetcher.fetch_cases(owner_id, &steam_id, self.appid).await;
        let inventory_private = outcome.is_private();
        let mut cases = outcome.into_items();
        let currency = self.settings.settings().currency;

        // assets of the same item share one quote
        let names = cases
            .iter()
            .map(|case| case.market_hash_name.clone())
            .collect::<HashSet<_>>();
        let mut items_priced = 0;
        let mut items_unpriced = 0;
        let mut prices: HashMap<String, Option<f64>> = HashMap::new();

        for name in names {
            let price = self.oracle.get_price(self.appid, &name, currency).await;

            match price {
                Some(_) => items_priced += 1,
                None => items_unpriced += 1,
            }

            prices.insert(name, price);
        }

        for case in cases.iter_mut() {
            case.unit_price = prices
                .get(&case.market_hash_name)
                .copied()
                .flatten();
        }

        Ok(AccountRefresh {
            steam_id,
            profile,
            inventory_private,
            cases,
            items_priced,
            items_unpriced,
        })
    }

    /// Refreshes accounts one at a time, awaiting each before starting the next so the shared
    /// client's spacing and quota bookkeeping stays coherent. Individual failures are counted
    /// and logged; the batch always runs to the end.
    pub async fn refresh_accounts(&self, accounts: &[(OwnerId, String)]) -> RefreshReport {
        let mut report = RefreshReport::default();

        for (owner_id, identifier) in accounts {
            match self.refresh_account(*owner_id, identifier).await {
                Ok(refresh) => {
                    report.accounts_refreshed += 1;
                    report.items_priced += refresh.items_priced;
                    report.items_unpriced += refresh.items_unpriced;
                    report.results.push((*owner_id, Ok(refresh)));
                },
                Err(error) => {
                    log::warn!(
                        "Failed to refresh account {} (\"{}\"): {}",
                        owner_id,
                        identifier,
                        error,
                    );
                    report.accounts_failed += 1;
                    report.results.push((*owner_id, Err(error)));
                },
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[tokio::test]
    async fn identity_failures_propagate_and_are_counted() {
        // no API key configured, so a vanity identifier cannot resolve
        let tracker = CaseTracker::builder()
            .settings(Settings::default())
            .build();
        let accounts = vec![(1, "gabelogannewell".to_string())];
        let report = tracker.refresh_accounts(&accounts).await;

        assert_eq!(report.accounts_refreshed, 0);
        assert_eq!(report.accounts_failed, 1);
        assert!(matches!(report.results[0], (1, Err(Error::MissingCredential))));
    }
}
