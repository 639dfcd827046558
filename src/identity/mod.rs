//! Resolves user-supplied identifiers into canonical [`SteamId`]s and fetches profile
//! metadata.

use crate::cache::TimedCache;
use crate::client::RateLimitedClient;
use crate::error::Error;
use crate::helpers::{parses_response, API_HOSTNAME};
use crate::response::{GetPlayerSummariesResponse, ResolveVanityUrlResponse};
use crate::settings::SettingsProvider;
use crate::steam_id::SteamId;
use crate::time::get_system_time;
use std::sync::{Arc, Mutex};
use reqwest::Method;
use serde::Serialize;

const PROFILE_MAX_AGE_SECS: u64 = 6 * 60 * 60;
/// Profiles with this visibility state are public. Every other value is private or
/// friends-only from our point of view.
const VISIBILITY_PUBLIC: u8 = 3;

/// Profile metadata for an account. Fetched fresh per resolution request and replaced
/// wholesale on refresh, never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInfo {
    pub display_name: String,
    pub profile_url: String,
    pub avatar_url: String,
    pub visibility_is_public: bool,
}

/// Normalizes the three accepted identifier forms - legacy string, 64-bit numeric, vanity name
/// or full profile URL - into the canonical legacy form, and fetches profile metadata.
#[derive(Debug)]
pub struct IdentityResolver {
    client: Arc<RateLimitedClient>,
    settings: Arc<dyn SettingsProvider>,
    profile_cache: Mutex<TimedCache<String, ProfileInfo>>,
}

impl IdentityResolver {
    pub fn new(client: Arc<RateLimitedClient>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            client,
            settings,
            profile_cache: Mutex::new(TimedCache::new(PROFILE_MAX_AGE_SECS)),
        }
    }

    fn get_api_url(&self, interface: &str, method: &str, version: usize) -> String {
        format!("{}/{}/{}/v{}/", API_HOSTNAME, interface, method, version)
    }

    /// Resolves an identifier into its canonical legacy form.
    ///
    /// Legacy identifiers are returned unchanged and 64-bit identifiers are converted without a
    /// network call. Anything else is treated as a vanity name and looked up through Steam,
    /// which requires an API key - fails with [`Error::MissingCredential`] when none is
    /// configured, or [`Error::IdentityNotFound`] when the lookup comes back empty.
    pub async fn resolve(&self, identifier: &str) -> Result<SteamId, Error> {
        if let Ok(steam_id) = identifier.parse::<SteamId>() {
            return Ok(steam_id);
        }

        if SteamId::is_steam64_str(identifier) {
            // the pattern guarantees 17 digits - this parse cannot fail
            return SteamId::from_steam64(identifier.parse::<u64>().unwrap());
        }

        match self.resolve_vanity(vanity_name(identifier)).await {
            Ok(steam_id) => Ok(steam_id),
            Err(Error::MissingCredential) => Err(Error::MissingCredential),
            Err(error) => {
                log::warn!("Failed to resolve \"{}\": {}", identifier, error);
                Err(Error::IdentityNotFound(identifier.into()))
            },
        }
    }

    async fn resolve_vanity(&self, vanity: &str) -> Result<SteamId, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            key: &'a str,
            vanityurl: &'a str,
        }

        let key = self.settings.settings().api_key
            .ok_or(Error::MissingCredential)?;
        let uri = self.get_api_url("ISteamUser", "ResolveVanityURL", 1);
        let request = self.client.request(Method::GET, &uri)
            .query(&Query {
                key: &key,
                vanityurl: vanity,
            })
            .build()?;
        let response = self.client.dispatch(request).await?;
        let body: ResolveVanityUrlResponse = parses_response(response).await?;
        let result = body.response;

        if result.success != 1 {
            return Err(Error::Response(
                result.message.unwrap_or_else(|| "No match".into())
            ));
        }

        let steamid = result.steamid
            .ok_or(Error::MalformedResponse("resolved response missing steamid"))?;
        let steam64 = steamid.parse::<u64>()
            .map_err(|_| Error::MalformedResponse("steamid is not numeric"))?;

        SteamId::from_steam64(steam64)
    }

    /// Fetches profile metadata for a canonical identifier, backed by a six-hour cache.
    /// Returns `None` when Steam cannot be reached or responds unusably; the failure is
    /// logged, never raised.
    pub async fn fetch_profile(&self, steam_id: &SteamId) -> Option<ProfileInfo> {
        let cache_key = steam_id.to_string();

        if let Some(profile) = self.profile_cache.lock().unwrap().get(&cache_key, get_system_time()) {
            return Some(profile);
        }

        match self.fetch_profile_request(steam_id).await {
            Ok(profile) => {
                self.profile_cache.lock().unwrap().insert(
                    cache_key,
                    profile.clone(),
                    get_system_time(),
                );

                Some(profile)
            },
            Err(error) => {
                log::warn!("Failed to fetch profile for {}: {}", steam_id, error);
                None
            },
        }
    }

    async fn fetch_profile_request(&self, steam_id: &SteamId) -> Result<ProfileInfo, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            key: &'a str,
            steamids: String,
        }

        let key = self.settings.settings().api_key
            .ok_or(Error::MissingCredential)?;
        let uri = self.get_api_url("ISteamUser", "GetPlayerSummaries", 2);
        let request = self.client.request(Method::GET, &uri)
            .query(&Query {
                key: &key,
                steamids: steam_id.to_steam64().to_string(),
            })
            .build()?;
        let response = self.client.dispatch(request).await?;
        let body: GetPlayerSummariesResponse = parses_response(response).await?;
        let player = body.response.players
            .into_iter()
            .next()
            .ok_or(Error::MalformedResponse("no players in summary response"))?;

        Ok(ProfileInfo {
            display_name: player.personaname,
            profile_url: player.profileurl,
            avatar_url: player.avatarmedium,
            visibility_is_public: player.communityvisibilitystate == VISIBILITY_PUBLIC,
        })
    }
}

/// Takes the vanity name out of a full profile URL, e.g.
/// `https://steamcommunity.com/id/gabelogannewell/` becomes `gabelogannewell`. Plain names
/// pass through untouched.
fn vanity_name(identifier: &str) -> &str {
    let trimmed = identifier.trim().trim_end_matches('/');

    match trimmed.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => trimmed,
    }
}
