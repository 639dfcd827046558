use crate::error::Error;
use crate::types::HttpClient;
use reqwest_middleware::ClientBuilder;
use serde::de::DeserializeOwned;
use url::Url;

pub(crate) const API_HOSTNAME: &str = "https://api.steampowered.com";
pub(crate) const COMMUNITY_HOSTNAME: &str = "https://steamcommunity.com";

/// Builds the shared HTTP client. No retry middleware is installed; HTTP 429 responses are
/// handled by [`crate::client::RateLimitedClient`] and transport failures propagate to the
/// caller.
pub fn get_default_middleware() -> HttpClient {
    let client = reqwest::ClientBuilder::new()
        .build()
        .unwrap();

    ClientBuilder::new(client).build()
}

/// Strips a URL down to its scheme, host, and path. Query strings can carry credentials and
/// must never reach the logs.
pub fn sanitized_url(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.path(),
    )
}

pub async fn check_response(response: reqwest::Response) -> Result<bytes::Bytes, Error> {
    let status = response.status();

    match status.as_u16() {
        400..=599 => Err(Error::Http(status)),
        _ => Ok(response.bytes().await?),
    }
}

pub async fn parses_response<D>(response: reqwest::Response) -> Result<D, Error>
where
    D: DeserializeOwned,
{
    let body = check_response(response).await?;

    Ok(serde_json::from_slice::<D>(&body)?)
}
