//! Time-related helpers.

use std::time::{SystemTime, UNIX_EPOCH};
use chrono::{DateTime, Utc};

/// The time used in responses from Steam.
pub type ServerTime = DateTime<Utc>;

/// Gets the current time.
pub fn get_server_time_now() -> ServerTime {
    ServerTime::from(SystemTime::now())
}

/// Gets the current unix timestamp in seconds.
pub fn get_system_time() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        // should never occur
        Err(_) => 0,
    }
}

/// Gets the current unix timestamp in milliseconds.
pub fn get_system_time_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_millis() as u64,
        // should never occur
        Err(_) => 0,
    }
}
