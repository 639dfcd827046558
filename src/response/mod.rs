//! Response types for upstream payloads. Every payload this crate consumes is deserialized into
//! one of these structures; fields Steam encodes as strings are parsed into numerics up front so
//! the rest of the crate never touches loosely typed JSON.

pub mod deserializers;

use crate::types::{Amount, AppId, AssetId, ClassId, InstanceId};
use std::collections::HashMap;
use serde::Deserialize;

/// Descriptions keyed by (classid, instanceid), as joined against assets.
pub type DescriptionMap = HashMap<(ClassId, InstanceId), Description>;

/// Response from `ISteamUser/ResolveVanityURL`.
#[derive(Deserialize, Debug, Clone)]
pub struct ResolveVanityUrlResponse {
    pub response: VanityUrlResult,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VanityUrlResult {
    /// `1` when the vanity name resolved to an account.
    pub success: i32,
    /// The 64-bit ID of the account, present on success.
    #[serde(default)]
    pub steamid: Option<String>,
    /// A message explaining the failure, present on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `ISteamUser/GetPlayerSummaries`.
#[derive(Deserialize, Debug, Clone)]
pub struct GetPlayerSummariesResponse {
    pub response: PlayerSummaries,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlayerSummaries {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlayerSummary {
    /// The display name chosen by the user.
    pub personaname: String,
    /// The full URL to the user's profile.
    pub profileurl: String,
    /// The URL to the medium-sized avatar image.
    pub avatarmedium: String,
    /// The profile visibility state. `3` means the profile is public; every other value is some
    /// flavor of not visible to us.
    #[serde(default)]
    pub communityvisibilitystate: u8,
}

/// Response from the community inventory endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct GetInventoryResponse {
    #[serde(default)]
    #[serde(deserialize_with = "deserializers::into_bool")]
    pub success: bool,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
    #[serde(default)]
    #[serde(deserialize_with = "deserializers::to_description_map")]
    pub descriptions: DescriptionMap,
}

/// An owned item instance as it appears in an inventory payload.
#[derive(Deserialize, Debug, Clone)]
pub struct RawAsset {
    #[serde(default)]
    pub appid: AppId,
    #[serde(deserialize_with = "deserializers::from_str")]
    pub assetid: AssetId,
    #[serde(deserialize_with = "deserializers::from_str")]
    pub classid: ClassId,
    #[serde(default)]
    #[serde(deserialize_with = "deserializers::option_str_0_as_none")]
    pub instanceid: InstanceId,
    /// The stack size. Steam sends this as a string; anything unparsable collapses to `1`.
    #[serde(default = "deserializers::one")]
    #[serde(deserialize_with = "deserializers::amount_or_one")]
    pub amount: Amount,
}

/// Item metadata keyed by (classid, instanceid) in an inventory payload.
#[derive(Deserialize, Debug, Clone)]
pub struct Description {
    #[serde(deserialize_with = "deserializers::from_str")]
    pub classid: ClassId,
    #[serde(default)]
    #[serde(deserialize_with = "deserializers::option_str_0_as_none")]
    pub instanceid: InstanceId,
    /// The name of the item.
    pub name: String,
    /// The market hash name. This is used to link to the item on the Steam Community Market.
    pub market_hash_name: String,
    /// The icon path, relative to the economy image CDN.
    #[serde(default)]
    pub icon_url: String,
}

/// Response from the market `priceoverview` endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct PriceOverviewResponse {
    #[serde(default)]
    pub success: bool,
    /// The lowest listed price, as a locale-formatted string e.g. `"$1,234.56"`.
    #[serde(default)]
    pub lowest_price: Option<String>,
    /// The median sale price. Present on items with enough volume.
    #[serde(default)]
    pub median_price: Option<String>,
}
