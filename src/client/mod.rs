//! Gates and dispatches all outbound requests to Steam.

mod clock;
mod options;

pub use clock::{Clock, SystemClock};
pub use options::RateLimitOptions;

use crate::error::Error;
use crate::helpers::{get_default_middleware, sanitized_url};
use crate::settings::SettingsProvider;
use crate::types::HttpClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use rand::Rng;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Method, Request, Response, StatusCode};
use url::Url;

/// Endpoint classes with distinct quota regimes. Community inventory requests are throttled far
/// more aggressively than anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointClass {
    Standard,
    Inventory,
}

impl EndpointClass {
    fn of(url: &Url) -> Self {
        if url.path().starts_with("/inventory/") {
            EndpointClass::Inventory
        } else {
            EndpointClass::Standard
        }
    }
}

/// Bookkeeping for outgoing requests. One instance per client, mutated on every dispatch and
/// reset when the quota window elapses. Never persisted.
#[derive(Debug, Default)]
struct RateLimitWindow {
    window_start: Option<u64>,
    requests_in_window: u32,
    last_request: Option<u64>,
    retry_counters: HashMap<String, u32>,
}

/// Dispatches requests while keeping call volume within Steam's limits. Knows nothing about
/// what the requests mean.
///
/// Every request waits out a randomized minimum spacing since the previous request, and
/// inventory-class requests are additionally held to a rolling per-window quota. HTTP 429
/// responses are retried with exponential backoff keyed by the request's logical path; all
/// other responses, including other error statuses, are returned to the caller to interpret.
/// Transport failures are logged and propagated without retry.
///
/// Construct one and share it behind an [`Arc`]; the spacing and quota bookkeeping only works
/// when every component dispatches through the same instance. Refresh operations must be
/// serialized by the caller - overlapping dispatch loops interleave their spacing waits.
#[derive(Debug)]
pub struct RateLimitedClient {
    client: HttpClient,
    settings: Arc<dyn SettingsProvider>,
    options: RateLimitOptions,
    clock: Arc<dyn Clock>,
    window: Mutex<RateLimitWindow>,
}

impl RateLimitedClient {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        options: RateLimitOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client: get_default_middleware(),
            settings,
            options,
            clock,
            window: Mutex::new(RateLimitWindow::default()),
        }
    }

    /// Starts building a request to be passed to [`RateLimitedClient::dispatch`].
    pub fn request(&self, method: Method, url: &str) -> reqwest_middleware::RequestBuilder {
        self.client.request(method, url)
    }

    /// Dispatches a request, suspending first until the spacing and quota rules allow it out.
    ///
    /// Returns the response for any status except 429, which is retried internally. Backoff
    /// attempts are counted per logical path; the counter is cleared on success, or on
    /// exhaustion so that a future call starts fresh.
    pub async fn dispatch(&self, request: Request) -> Result<Response, Error> {
        let endpoint = EndpointClass::of(request.url());
        let logical_path = sanitized_url(request.url());

        loop {
            self.acquire_slot(endpoint).await;

            let mut attempt_request = request.try_clone()
                .ok_or(Error::Parameter("Request body cannot be cloned for dispatch"))?;

            self.assign_user_agent(&mut attempt_request);
            // the query string may carry the API key - log the path only
            log::debug!("{} {}", attempt_request.method(), logical_path);

            let response = match self.client.execute(attempt_request).await {
                Ok(response) => response,
                Err(error) => {
                    log::warn!("Request to {} failed: {}", logical_path, error);
                    return Err(error.into());
                },
            };

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                self.clear_retry_counter(&logical_path);
                return Ok(response);
            }

            let attempt = self.note_throttled(&logical_path);

            if attempt > self.options.max_retry_attempts {
                self.clear_retry_counter(&logical_path);
                return Err(Error::RateLimitExceeded(logical_path));
            }

            let delay = self.backoff_delay(attempt);

            log::warn!(
                "Throttled on {}; backing off {}ms (attempt {})",
                logical_path,
                delay.as_millis(),
                attempt,
            );
            self.clock.sleep(delay).await;
        }
    }

    /// Waits until the next request is allowed out, then claims the slot.
    async fn acquire_slot(&self, endpoint: EndpointClass) {
        self.wait_request_spacing().await;

        if endpoint == EndpointClass::Inventory {
            self.wait_inventory_quota().await;
        }

        let mut window = self.window.lock().unwrap();

        window.last_request = Some(self.clock.now_millis());
    }

    /// Suspends until the randomized minimum spacing since the previous request has elapsed.
    async fn wait_request_spacing(&self) {
        let base = self.settings.settings().request_delay_ms;
        let jitter = if self.options.jitter_band_ms > 0 {
            rand::rng().random_range(0..=self.options.jitter_band_ms)
        } else {
            0
        };
        let spacing = base + jitter;
        let wait = {
            let window = self.window.lock().unwrap();

            match window.last_request {
                Some(last) => {
                    let elapsed = self.clock.now_millis().saturating_sub(last);

                    spacing.saturating_sub(elapsed)
                },
                None => 0,
            }
        };

        if wait > 0 {
            self.clock.sleep(Duration::from_millis(wait)).await;
        }
    }

    /// Claims an inventory slot in the current quota window, suspending past the end of the
    /// window plus a safety buffer when the quota is exhausted.
    async fn wait_inventory_quota(&self) {
        loop {
            let now = self.clock.now_millis();
            let wait = {
                let mut window = self.window.lock().unwrap();

                match window.window_start {
                    Some(start) if now.saturating_sub(start) < self.options.inventory_window_ms => {
                        if window.requests_in_window < self.options.inventory_quota {
                            window.requests_in_window += 1;
                            0
                        } else {
                            (start + self.options.inventory_window_ms + self.options.inventory_window_buffer_ms)
                                .saturating_sub(now)
                        }
                    },
                    _ => {
                        window.window_start = Some(now);
                        window.requests_in_window = 1;
                        0
                    },
                }
            };

            if wait == 0 {
                return;
            }

            self.clock.sleep(Duration::from_millis(wait)).await;
        }
    }

    /// Picks a random identity string from the configured pool. A user agent already supplied
    /// by the caller is not overridden.
    fn assign_user_agent(&self, request: &mut Request) {
        if request.headers().contains_key(USER_AGENT) {
            return;
        }

        let pool = self.settings.settings().user_agent_pool;

        if pool.is_empty() {
            return;
        }

        let agent = &pool[rand::rng().random_range(0..pool.len())];

        if let Ok(value) = HeaderValue::from_str(agent) {
            request.headers_mut().insert(USER_AGENT, value);
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let millis = self.options.backoff_base_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.options.backoff_cap_ms);

        Duration::from_millis(millis)
    }

    fn note_throttled(&self, logical_path: &str) -> u32 {
        let mut window = self.window.lock().unwrap();
        let counter = window.retry_counters
            .entry(logical_path.to_string())
            .or_insert(0);

        *counter += 1;
        *counter
    }

    fn clear_retry_counter(&self, logical_path: &str) {
        self.window.lock().unwrap().retry_counters.remove(logical_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::clock::fake::FakeClock;
    use crate::settings::Settings;

    fn test_client(
        request_delay_ms: u64,
        options: RateLimitOptions,
        clock: Arc<FakeClock>,
    ) -> RateLimitedClient {
        let settings = Settings {
            request_delay_ms,
            ..Settings::default()
        };

        RateLimitedClient::new(Arc::new(settings), options, clock)
    }

    fn no_jitter_options() -> RateLimitOptions {
        RateLimitOptions {
            jitter_band_ms: 0,
            inventory_quota: 2,
            inventory_window_ms: 1_000,
            inventory_window_buffer_ms: 100,
            ..RateLimitOptions::default()
        }
    }

    #[tokio::test]
    async fn spaces_out_consecutive_requests() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(100, no_jitter_options(), Arc::clone(&clock));

        client.acquire_slot(EndpointClass::Standard).await;
        assert_eq!(clock.now_millis(), 0);

        client.acquire_slot(EndpointClass::Standard).await;
        assert_eq!(clock.now_millis(), 100);
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![100]);
    }

    #[tokio::test]
    async fn skips_spacing_when_enough_time_has_passed() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(100, no_jitter_options(), Arc::clone(&clock));

        client.acquire_slot(EndpointClass::Standard).await;
        clock.sleep(Duration::from_millis(500)).await;
        client.acquire_slot(EndpointClass::Standard).await;

        // only the explicit sleep; the second acquire went straight through
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![500]);
    }

    #[tokio::test]
    async fn defers_inventory_requests_past_the_quota_window() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(0, no_jitter_options(), Arc::clone(&clock));

        client.acquire_slot(EndpointClass::Inventory).await;
        client.acquire_slot(EndpointClass::Inventory).await;
        assert_eq!(clock.now_millis(), 0);

        // quota of 2 exhausted - the third request must wait for the window to roll over plus
        // the safety buffer
        client.acquire_slot(EndpointClass::Inventory).await;
        assert_eq!(clock.now_millis(), 1_100);

        let window = client.window.lock().unwrap();

        assert_eq!(window.requests_in_window, 1);
        assert_eq!(window.window_start, Some(1_100));
    }

    #[tokio::test]
    async fn standard_requests_ignore_the_inventory_quota() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(0, no_jitter_options(), Arc::clone(&clock));

        for _ in 0..10 {
            client.acquire_slot(EndpointClass::Standard).await;
        }

        assert_eq!(clock.now_millis(), 0);
    }

    #[test]
    fn classifies_endpoints_by_path() {
        let inventory = Url::parse("https://steamcommunity.com/inventory/76561197960287930/730/2").unwrap();
        let price = Url::parse("https://steamcommunity.com/market/priceoverview/").unwrap();

        assert_eq!(EndpointClass::of(&inventory), EndpointClass::Inventory);
        assert_eq!(EndpointClass::of(&price), EndpointClass::Standard);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(0, RateLimitOptions::default(), clock);

        assert_eq!(client.backoff_delay(1), Duration::from_millis(4_000));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(8_000));
        assert_eq!(client.backoff_delay(5), Duration::from_millis(60_000));
    }

    #[test]
    fn retry_counters_are_kept_per_path() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(0, RateLimitOptions::default(), clock);

        assert_eq!(client.note_throttled("https://steamcommunity.com/market/priceoverview/"), 1);
        assert_eq!(client.note_throttled("https://steamcommunity.com/market/priceoverview/"), 2);
        assert_eq!(client.note_throttled("https://steamcommunity.com/inventory/1/730/2"), 1);

        client.clear_retry_counter("https://steamcommunity.com/market/priceoverview/");

        assert_eq!(client.note_throttled("https://steamcommunity.com/market/priceoverview/"), 1);
    }

    #[test]
    fn keeps_caller_supplied_user_agent() {
        let clock = Arc::new(FakeClock::at(0));
        let client = test_client(0, RateLimitOptions::default(), clock);
        let mut request = reqwest::Client::new()
            .get("https://steamcommunity.com/market/priceoverview/")
            .header(USER_AGENT, "custom-agent")
            .build()
            .unwrap();

        client.assign_user_agent(&mut request);

        assert_eq!(request.headers().get(USER_AGENT).unwrap(), "custom-agent");
    }

    #[test]
    fn assigns_a_user_agent_from_the_pool() {
        let clock = Arc::new(FakeClock::at(0));
        let settings = Settings {
            request_delay_ms: 0,
            user_agent_pool: vec!["only-agent".to_string()],
            ..Settings::default()
        };
        let client = RateLimitedClient::new(
            Arc::new(settings),
            RateLimitOptions::default(),
            clock,
        );
        let mut request = reqwest::Client::new()
            .get("https://steamcommunity.com/market/priceoverview/")
            .build()
            .unwrap();

        client.assign_user_agent(&mut request);

        assert_eq!(request.headers().get(USER_AGENT).unwrap(), "only-agent");
    }
}
