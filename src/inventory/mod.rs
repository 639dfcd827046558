//! Retrieves the tradable-container subset of account inventories.

use crate::cache::TimedCache;
use crate::client::RateLimitedClient;
use crate::error::Error;
use crate::helpers::{parses_response, COMMUNITY_HOSTNAME};
use crate::response::GetInventoryResponse;
use crate::steam_id::SteamId;
use crate::time::get_system_time;
use crate::types::{Amount, AppId, AssetId, ClassId, InstanceId, OwnerId};
use std::sync::{Arc, Mutex};
use reqwest::{Method, StatusCode};
use serde::Serialize;

/// The default application: Counter-Strike 2.
pub const DEFAULT_APPID: AppId = 730;

const ICON_BASE_URL: &str = "https://community.cloudflare.steamstatic.com/economy/image/";
const INVENTORY_MAX_AGE_SECS: u64 = 2 * 60 * 60;

/// Substrings identifying container items worth tracking.
const CASE_INDICATORS: &[&str] = &["Case", "Container", "Operation", "eSports Case"];
/// Substrings that disqualify an item even when an indicator matches. Keys and graffiti
/// mention cases in their names without being cases.
const CASE_EXCLUDERS: &[&str] = &["Key", "Graffiti"];

/// A case in someone's inventory. The natural key for upserts is
/// (owner_id, appid, assetid); a refresh supersedes all of an account's previous items rather
/// than merging with them.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseItem {
    pub owner_id: OwnerId,
    pub appid: AppId,
    pub assetid: AssetId,
    pub classid: ClassId,
    pub instanceid: InstanceId,
    pub name: String,
    pub market_hash_name: String,
    pub image_url: String,
    /// The stack size. Always at least 1.
    pub amount: Amount,
    /// The market price per unit. Absent until priced.
    pub unit_price: Option<f64>,
}

/// The outcome of an inventory fetch. Failures degrade to an empty item list so batch
/// refreshes can make partial progress; the variant records why.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryOutcome {
    /// The inventory was fetched, or served from cache.
    Items(Vec<CaseItem>),
    /// Steam responded 403 - the inventory is private. Whoever persists these results should
    /// update the owning account's privacy flag.
    Private,
    /// The fetch failed. The error has already been logged.
    Failed,
}

impl InventoryOutcome {
    /// The fetched items; empty for [`InventoryOutcome::Private`] and
    /// [`InventoryOutcome::Failed`].
    pub fn into_items(self) -> Vec<CaseItem> {
        match self {
            InventoryOutcome::Items(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn is_private(&self) -> bool {
        *self == InventoryOutcome::Private
    }
}

/// Fetches inventories and filters them down to the containers we track.
#[derive(Debug)]
pub struct InventoryFetcher {
    client: Arc<RateLimitedClient>,
    cache: Mutex<TimedCache<(u64, AppId), Vec<CaseItem>>>,
}

impl InventoryFetcher {
    pub fn new(client: Arc<RateLimitedClient>) -> Self {
        Self {
            client,
            cache: Mutex::new(TimedCache::new(INVENTORY_MAX_AGE_SECS)),
        }
    }

    /// Fetches the cases in an account's inventory, backed by a two-hour cache keyed by
    /// (identity, application). Cached items are rebound to the supplied `owner_id` - the
    /// upstream inventory belongs to the Steam identity, not to whichever account row asked
    /// for it.
    ///
    /// Never raises to the caller: failures come back as [`InventoryOutcome::Private`] or
    /// [`InventoryOutcome::Failed`] after being logged. A failed refetch leaves any previously
    /// cached items in place.
    pub async fn fetch_cases(
        &self,
        owner_id: OwnerId,
        steam_id: &SteamId,
        appid: AppId,
    ) -> InventoryOutcome {
        let steam64 = steam_id.to_steam64();

        if let Some(mut items) = self.cache.lock().unwrap().get(&(steam64, appid), get_system_time()) {
            for item in items.iter_mut() {
                item.owner_id = owner_id;
            }

            return InventoryOutcome::Items(items);
        }

        match self.fetch_cases_request(owner_id, steam64, appid).await {
            Ok(items) => {
                self.cache.lock().unwrap().insert(
                    (steam64, appid),
                    items.clone(),
                    get_system_time(),
                );

                InventoryOutcome::Items(items)
            },
            Err(Error::Http(StatusCode::FORBIDDEN)) => {
                log::info!("Inventory of {} is private", steam_id);
                InventoryOutcome::Private
            },
            Err(error) => {
                log::warn!("Failed to fetch inventory {}/{}: {}", steam_id, appid, error);
                InventoryOutcome::Failed
            },
        }
    }

    async fn fetch_cases_request(
        &self,
        owner_id: OwnerId,
        steam64: u64,
        appid: AppId,
    ) -> Result<Vec<CaseItem>, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            l: &'a str,
        }

        // context 2 is where tradable community items live. No count parameter is sent - large
        // explicit counts are known to trigger 400s from this endpoint.
        let uri = format!("{}/inventory/{}/{}/2", COMMUNITY_HOSTNAME, steam64, appid);
        let request = self.client.request(Method::GET, &uri)
            .query(&Query {
                l: "english",
            })
            .build()?;
        let response = self.client.dispatch(request).await?;
        let body: GetInventoryResponse = parses_response(response).await?;

        if !body.success {
            return Err(Error::Response("Inventory response not flagged successful".into()));
        }

        Ok(normalize_cases(owner_id, appid, body))
    }
}

/// Joins each asset to its description and keeps the ones describing cases. Assets without a
/// matching description cannot be classified and are dropped.
fn normalize_cases(owner_id: OwnerId, appid: AppId, body: GetInventoryResponse) -> Vec<CaseItem> {
    let mut items = Vec::new();

    for asset in body.assets {
        let description = match body.descriptions.get(&(asset.classid, asset.instanceid)) {
            Some(description) => description,
            None => {
                log::debug!("Missing description for item {}:{:?}", asset.classid, asset.instanceid);
                continue;
            },
        };

        if !is_case(&description.name) && !is_case(&description.market_hash_name) {
            continue;
        }

        items.push(CaseItem {
            owner_id,
            appid,
            assetid: asset.assetid,
            classid: asset.classid,
            instanceid: asset.instanceid,
            name: description.name.clone(),
            market_hash_name: description.market_hash_name.clone(),
            image_url: format!("{}{}", ICON_BASE_URL, description.icon_url),
            amount: asset.amount,
            unit_price: None,
        });
    }

    items
}

/// Whether an item name identifies a container we track.
fn is_case(name: &str) -> bool {
    if CASE_EXCLUDERS.iter().any(|excluder| name.contains(excluder)) {
        return false;
    }

    CASE_INDICATORS.iter().any(|indicator| name.contains(indicator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RateLimitOptions, SystemClock};
    use crate::settings::{Settings, SettingsProvider};

    fn fetcher() -> InventoryFetcher {
        let settings: Arc<dyn SettingsProvider> = Arc::new(Settings::default());
        let client = Arc::new(RateLimitedClient::new(
            settings,
            RateLimitOptions::default(),
            Arc::new(SystemClock),
        ));

        InventoryFetcher::new(client)
    }

    fn case_item(owner_id: OwnerId, assetid: AssetId) -> CaseItem {
        CaseItem {
            owner_id,
            appid: DEFAULT_APPID,
            assetid,
            classid: 1293508920,
            instanceid: None,
            name: "Chroma 3 Case".into(),
            market_hash_name: "Chroma 3 Case".into(),
            image_url: format!("{}abc", ICON_BASE_URL),
            amount: 1,
            unit_price: None,
        }
    }

    #[test]
    fn classifies_case_names() {
        assert!(is_case("Chroma 3 Case"));
        assert!(is_case("Operation Breakout Weapon Case"));
        assert!(is_case("Community Sticker Capsule 1 Container"));
        assert!(is_case("eSports 2013 Case"));
        assert!(!is_case("Chroma 3 Case Key"));
        assert!(!is_case("Sealed Graffiti | Recoil AWP"));
        assert!(!is_case("Sticker | Crowbar"));
        assert!(!is_case("AK-47 | Redline (Field-Tested)"));
    }

    #[test]
    fn keeps_only_cases_when_normalizing() {
        // one case, one key, one sticker
        let body: GetInventoryResponse =
            serde_json::from_str(include_str!("../response/fixtures/inventory.json")).unwrap();
        let items = normalize_cases(7, DEFAULT_APPID, body);

        assert_eq!(items.len(), 1);

        let item = &items[0];

        assert_eq!(item.owner_id, 7);
        assert_eq!(item.name, "Chroma 3 Case");
        assert_eq!(item.assetid, 25341129424);
        assert_eq!(item.amount, 1);
        assert_eq!(item.unit_price, None);
        assert!(item.image_url.starts_with(ICON_BASE_URL));
    }

    #[tokio::test]
    async fn cached_inventories_are_rebound_to_the_caller() {
        let fetcher = fetcher();
        let steam_id = "STEAM_0:0:11101".parse::<SteamId>().unwrap();

        fetcher.cache.lock().unwrap().insert(
            (steam_id.to_steam64(), DEFAULT_APPID),
            vec![case_item(1, 25341129424)],
            get_system_time(),
        );

        // a cache miss would issue a real request; the hit returns instantly with the new owner
        let outcome = fetcher.fetch_cases(2, &steam_id, DEFAULT_APPID).await;

        assert_eq!(outcome, InventoryOutcome::Items(vec![case_item(2, 25341129424)]));
    }

    #[test]
    fn outcomes_degrade_to_empty_item_lists() {
        assert_eq!(InventoryOutcome::Private.into_items(), Vec::new());
        assert_eq!(InventoryOutcome::Failed.into_items(), Vec::new());
        assert!(InventoryOutcome::Private.is_private());
        assert!(!InventoryOutcome::Failed.is_private());
    }
}
