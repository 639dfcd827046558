use reqwest::StatusCode;
use reqwest_middleware;

/// Any errors raised when making requests to Steam.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An invalid parameter was supplied.
    #[error("Invalid parameter: {}", .0)]
    Parameter(&'static str),
    /// Steam responded with something other than what was asked for.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    /// A transport-level failure occurred (DNS, connection reset, timeout). These are not
    /// retried by this crate.
    #[error("Network error: {}", .0)]
    Network(#[from] reqwest::Error),
    /// An error occurred in the request middleware.
    #[error("Request middleware error: {}", .0)]
    Middleware(anyhow::Error),
    /// Steam responded with too many requests and retries for this path were exhausted.
    #[error("Rate limit exceeded for {}", .0)]
    RateLimitExceeded(String),
    /// Steam responded with a non-2xx, non-429 HTTP status.
    #[error("Error {}", .0)]
    Http(StatusCode),
    /// The supplied identifier could not be resolved to a Steam account.
    #[error("No account found for \"{}\"", .0)]
    IdentityNotFound(String),
    /// An API key is required for this request but none is configured.
    #[error("Missing API key")]
    MissingCredential,
    /// The supplied string does not match the expected identifier format.
    #[error("Invalid identifier format: {}", .0)]
    InvalidFormat(String),
    /// Steam responded with a payload missing a required field.
    #[error("Malformed response: {}", .0)]
    MalformedResponse(&'static str),
    /// An error occurred deserializing the response body.
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Network(e),
            reqwest_middleware::Error::Middleware(e) => Error::Middleware(e),
        }
    }
}
