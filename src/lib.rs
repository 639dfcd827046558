//! # steam-case-tracker
//!
//! Tracks Steam Community Market case inventories across multiple Steam accounts: resolves
//! identities, fetches inventories, fetches market prices, and hands plain records back to the
//! caller. Where results are stored and how they are displayed is up to you.
//!
//! All requests go through one shared rate-limited client which spaces requests out with
//! randomized delays, holds inventory requests to Steam's per-window quota, and backs off on
//! throttling. Refresh operations must run one at a time against a tracker.
//!
//! ```no_run
//! use steam_case_tracker::{CaseTracker, Settings};
//!
//! # async fn run() {
//! let tracker = CaseTracker::builder()
//!     .settings(Settings {
//!         api_key: Some(String::from("key")),
//!         ..Settings::default()
//!     })
//!     .build();
//! let refresh = tracker.refresh_account(1, "76561197960287930").await.unwrap();
//!
//! for case in refresh.cases {
//!     println!("{} x{}", case.name, case.amount);
//! }
//! # }
//! ```

mod cache;
mod currency;
mod error;
mod helpers;
mod settings;
mod steam_id;
mod tracker;
pub mod client;
pub mod identity;
pub mod inventory;
pub mod price;
pub mod response;
pub mod time;
pub mod types;

pub use currency::Currency;
pub use error::Error;
pub use settings::{Settings, SettingsProvider, DEFAULT_USER_AGENTS};
pub use steam_id::SteamId;
pub use client::{Clock, RateLimitOptions, RateLimitedClient, SystemClock};
pub use identity::{IdentityResolver, ProfileInfo};
pub use inventory::{CaseItem, InventoryFetcher, InventoryOutcome, DEFAULT_APPID};
pub use price::{format_price, PriceOracle, PriceQuote};
pub use tracker::{AccountRefresh, CaseTracker, CaseTrackerBuilder, RefreshReport};
