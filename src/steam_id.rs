//! The [`SteamId`] value type.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use lazy_regex::regex_captures;

/// The 64-bit representation of an individual account in the public universe with the desktop
/// instance: universe 1, account type 1, instance 1.
const STEAM64_IDENT: u64 = 0x0110_0001;
/// The lowest 64-bit ID of an individual account. Equal to `STEAM64_IDENT << 32`.
const STEAM64_BASE: u64 = 76561197960265728;

/// A Steam account identity in its canonical legacy form. The legacy string and the 64-bit
/// numeric form are mutually derivable without precision loss; the bijection covers the
/// authentication-server bit and the account number, which together make up the low 32 bits of
/// the 64-bit ID.
///
/// This is a value type computed on demand from a stored string. It is never persisted itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SteamId {
    /// The universe digit as it appeared in the parsed identifier. Not part of the 64-bit
    /// conversion; IDs derived from a 64-bit value carry universe `0`.
    pub universe: u8,
    /// The authentication server bit.
    pub auth_server: u8,
    /// The account number. At most 2^31 - 1 so that `account_number << 1 | auth_server` fits in
    /// 32 bits.
    pub account_number: u32,
}

impl SteamId {
    /// Converts a 64-bit ID into its legacy form. Fails with [`Error::InvalidFormat`] when the
    /// high-order bits do not carry the fixed individual-account prefix.
    pub fn from_steam64(steam64: u64) -> Result<Self, Error> {
        if steam64 >> 32 != STEAM64_IDENT {
            return Err(Error::InvalidFormat(steam64.to_string()));
        }

        let account_bits = (steam64 & 0xFFFF_FFFF) as u32;

        Ok(Self {
            universe: 0,
            auth_server: (account_bits & 1) as u8,
            account_number: account_bits >> 1,
        })
    }

    /// Converts to the 64-bit numeric form. Exact for all account numbers; the arithmetic stays
    /// within `u64`.
    pub fn to_steam64(&self) -> u64 {
        STEAM64_BASE + (self.account_number as u64) * 2 + self.auth_server as u64
    }

    /// Whether a string looks like a 64-bit ID: the fixed high-order prefix renders all
    /// individual account IDs as 17-digit numbers starting with `7656`.
    pub fn is_steam64_str(s: &str) -> bool {
        lazy_regex::regex_is_match!(r"^7656\d{13}$", s)
    }
}

impl FromStr for SteamId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, universe, auth_server, account_number) = regex_captures!(
            r"^STEAM_([0-5]):([01]):(\d+)$",
            s,
        ).ok_or_else(|| Error::InvalidFormat(s.into()))?;
        let account_number = account_number.parse::<u32>()
            .map_err(|_| Error::InvalidFormat(s.into()))?;

        if account_number > u32::MAX >> 1 {
            return Err(Error::InvalidFormat(s.into()));
        }

        Ok(Self {
            // both capture groups are single digits - parses cannot fail
            universe: universe.parse().unwrap(),
            auth_server: auth_server.parse().unwrap(),
            account_number,
        })
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STEAM_{}:{}:{}", self.universe, self.auth_server, self.account_number)
    }
}

impl From<SteamId> for u64 {
    fn from(steam_id: SteamId) -> u64 {
        steam_id.to_steam64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_form() {
        let steam_id = "STEAM_0:0:11101".parse::<SteamId>().unwrap();

        assert_eq!(steam_id.universe, 0);
        assert_eq!(steam_id.auth_server, 0);
        assert_eq!(steam_id.account_number, 11101);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!("STEAM_6:0:11101".parse::<SteamId>().is_err());
        assert!("STEAM_0:2:11101".parse::<SteamId>().is_err());
        assert!("STEAM_0:0:".parse::<SteamId>().is_err());
        assert!("76561197960287930".parse::<SteamId>().is_err());
    }

    #[test]
    fn converts_to_steam64() {
        let steam_id = "STEAM_0:0:11101".parse::<SteamId>().unwrap();

        assert_eq!(steam_id.to_steam64(), 76561197960287930);
    }

    #[test]
    fn converts_from_steam64() {
        let steam_id = SteamId::from_steam64(76561197960287930).unwrap();

        assert_eq!(steam_id.to_string(), "STEAM_0:0:11101");
    }

    #[test]
    fn rejects_out_of_range_steam64() {
        assert!(SteamId::from_steam64(103582791429521412).is_err());
        assert!(SteamId::from_steam64(11101).is_err());
    }

    #[test]
    fn round_trips_legacy_form() {
        for s in ["STEAM_0:0:1", "STEAM_0:1:4491990", "STEAM_0:1:2147483647"] {
            let steam_id = s.parse::<SteamId>().unwrap();
            let converted = SteamId::from_steam64(steam_id.to_steam64()).unwrap();

            assert_eq!(converted.to_string(), s);
        }
    }

    #[test]
    fn round_trips_steam64_near_account_number_limit() {
        // the top of the 32-bit account space must survive the conversion exactly
        let steam64 = STEAM64_BASE + u32::MAX as u64;
        let steam_id = SteamId::from_steam64(steam64).unwrap();

        assert_eq!(steam_id.account_number, u32::MAX >> 1);
        assert_eq!(steam_id.auth_server, 1);
        assert_eq!(steam_id.to_steam64(), steam64);
    }
}
