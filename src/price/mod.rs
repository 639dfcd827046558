//! Retrieves and normalizes Steam Community Market prices.

use crate::cache::TimedCache;
use crate::client::RateLimitedClient;
use crate::currency::Currency;
use crate::error::Error;
use crate::helpers::{parses_response, COMMUNITY_HOSTNAME};
use crate::response::PriceOverviewResponse;
use crate::settings::SettingsProvider;
use crate::time::{get_server_time_now, get_system_time, ServerTime};
use crate::types::AppId;
use std::sync::{Arc, Mutex};
use reqwest::Method;
use serde::Serialize;

const PRICE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// A current market price for one item in one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub appid: AppId,
    pub market_hash_name: String,
    pub currency: Currency,
    /// The unit price, or `None` when the market had no usable price.
    pub amount: Option<f64>,
    pub fetched_at: ServerTime,
}

/// Fetches market prices with a 24-hour cache of parsed amounts keyed by
/// (application, item, currency).
#[derive(Debug)]
pub struct PriceOracle {
    client: Arc<RateLimitedClient>,
    settings: Arc<dyn SettingsProvider>,
    cache: Mutex<TimedCache<(AppId, String, Currency), f64>>,
}

impl PriceOracle {
    pub fn new(client: Arc<RateLimitedClient>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            client,
            settings,
            cache: Mutex::new(TimedCache::new(PRICE_MAX_AGE_SECS)),
        }
    }

    /// Gets the current market price of an item. Returns `None` on any failure after logging
    /// it - a missing price never aborts a batch refresh.
    pub async fn get_price(
        &self,
        appid: AppId,
        market_hash_name: &str,
        currency: Currency,
    ) -> Option<f64> {
        let key = (appid, market_hash_name.to_string(), currency);

        if let Some(amount) = self.cache.lock().unwrap().get(&key, get_system_time()) {
            return Some(amount);
        }

        match self.get_price_request(appid, market_hash_name, currency).await {
            Ok(Some(amount)) => {
                self.cache.lock().unwrap().insert(key, amount, get_system_time());

                Some(amount)
            },
            Ok(None) => {
                log::info!("No price listed for \"{}\" in {}", market_hash_name, currency);
                None
            },
            Err(error) => {
                log::warn!(
                    "Failed to fetch price for \"{}\" in {}: {}",
                    market_hash_name,
                    currency,
                    error,
                );
                None
            },
        }
    }

    /// Gets a price as a full [`PriceQuote`] record for handing to a persistence layer. Uses
    /// the configured currency when `currency` is `None`.
    pub async fn get_quote(
        &self,
        appid: AppId,
        market_hash_name: &str,
        currency: Option<Currency>,
    ) -> PriceQuote {
        let currency = currency.unwrap_or_else(|| self.settings.settings().currency);
        let amount = self.get_price(appid, market_hash_name, currency).await;

        PriceQuote {
            appid,
            market_hash_name: market_hash_name.to_string(),
            currency,
            amount,
            fetched_at: get_server_time_now(),
        }
    }

    async fn get_price_request(
        &self,
        appid: AppId,
        market_hash_name: &str,
        currency: Currency,
    ) -> Result<Option<f64>, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            appid: AppId,
            currency: u32,
            market_hash_name: &'a str,
        }

        let uri = format!("{}/market/priceoverview/", COMMUNITY_HOSTNAME);
        let request = self.client.request(Method::GET, &uri)
            .query(&Query {
                appid,
                currency: currency.id(),
                market_hash_name,
            })
            .build()?;
        let response = self.client.dispatch(request).await?;
        let body: PriceOverviewResponse = parses_response(response).await?;

        if !body.success {
            return Err(Error::Response("Price response not flagged successful".into()));
        }

        Ok(select_price_field(&body).and_then(parse_price))
    }
}

/// Prefers the lowest listed price, falling back to the median. Empty strings count as absent.
fn select_price_field(body: &PriceOverviewResponse) -> Option<&str> {
    body.lowest_price.as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| body.median_price.as_deref().filter(|s| !s.is_empty()))
}

/// Parses a locale-formatted price string into a number.
///
/// Keeps digits, commas, and periods. When both separators appear, the rightmost one is the
/// decimal separator and the other is removed as a thousands separator; a lone comma is a
/// decimal separator. This handles both `1,234.56` and `1.234,56` conventions.
pub fn parse_price(s: &str) -> Option<f64> {
    let cleaned = s.chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect::<String>();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(period)) if comma > period => {
            cleaned.replace('.', "").replace(',', ".")
        },
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized.parse::<f64>().ok()
}

/// Formats an amount for display, e.g. `$1.23`. A missing amount formats as `"N/A"`.
pub fn format_price(amount: Option<f64>, currency: Currency) -> String {
    match amount {
        Some(amount) => match currency.symbol() {
            Some(symbol) => format!("{}{:.2}", symbol, amount),
            None => format!("{:.2} {}", amount, currency),
        },
        None => "N/A".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RateLimitOptions, SystemClock};
    use crate::settings::Settings;

    fn oracle() -> PriceOracle {
        let settings: Arc<dyn SettingsProvider> = Arc::new(Settings::default());
        let client = Arc::new(RateLimitedClient::new(
            Arc::clone(&settings),
            RateLimitOptions::default(),
            Arc::new(SystemClock),
        ));

        PriceOracle::new(client, settings)
    }

    #[test]
    fn parses_both_locale_conventions_identically() {
        assert_eq!(parse_price("$1,234.56"), Some(1234.56));
        assert_eq!(parse_price("1.234,56€"), Some(1234.56));
    }

    #[test]
    fn parses_simple_prices() {
        assert_eq!(parse_price("$0.03"), Some(0.03));
        assert_eq!(parse_price("2,37€"), Some(2.37));
        assert_eq!(parse_price("¥ 1,058.5"), Some(1058.5));
        assert_eq!(parse_price("150"), Some(150.0));
    }

    #[test]
    fn unparsable_prices_are_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn prefers_the_lowest_price_over_the_median() {
        let body = PriceOverviewResponse {
            success: true,
            lowest_price: Some("$0.51".into()),
            median_price: Some("$0.52".into()),
        };

        assert_eq!(select_price_field(&body), Some("$0.51"));
    }

    #[test]
    fn falls_back_to_the_median_price() {
        let body = PriceOverviewResponse {
            success: true,
            lowest_price: None,
            median_price: Some("$0.52".into()),
        };

        assert_eq!(select_price_field(&body), Some("$0.52"));
    }

    #[test]
    fn empty_price_fields_yield_no_price() {
        let body = PriceOverviewResponse {
            success: true,
            lowest_price: Some("".into()),
            median_price: Some("".into()),
        };

        assert_eq!(select_price_field(&body).and_then(parse_price), None);
    }

    #[tokio::test]
    async fn cached_prices_are_returned_without_a_request() {
        let oracle = oracle();

        oracle.cache.lock().unwrap().insert(
            (730, "Chroma 3 Case".to_string(), Currency::USD),
            0.51,
            get_system_time(),
        );

        // a cache miss would issue a real request; the hit returns the parsed amount as-is
        let price = oracle.get_price(730, "Chroma 3 Case", Currency::USD).await;

        assert_eq!(price, Some(0.51));
    }

    #[test]
    fn formats_prices_for_display() {
        assert_eq!(format_price(Some(1234.5), Currency::USD), "$1234.50");
        assert_eq!(format_price(Some(2.37), Currency::EUR), "€2.37");
        assert_eq!(format_price(Some(10.0), Currency::NOK), "10.00 NOK");
        assert_eq!(format_price(None, Currency::USD), "N/A");
    }
}
