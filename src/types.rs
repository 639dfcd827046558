//! Types for common values in Steam responses.

/// Uniquely identifies an application on Steam. For example: 730 for Counter-Strike 2.
pub type AppId = u32;
/// An asset ID unique to an [`AppId`] + inventory context combination.
pub type AssetId = u64;
/// An amount for stackable items. For non-stackable items this is simply `1`.
pub type Amount = u32;
/// An ID for a description which provides a general overview of an item.
pub type ClassId = u64;
/// A more specific instance of a description, for example an item with a sticker applied.
pub type InstanceId = Option<u64>;
/// The row ID of the owning account in whatever store the caller persists to. Inventories are
/// cached by Steam identity, not by owner, so the same items may be rebound to different owners.
pub type OwnerId = i64;

pub use crate::time::ServerTime;

// Types internally used by the crate.
use reqwest_middleware::ClientWithMiddleware;

pub(crate) type HttpClient = ClientWithMiddleware;
