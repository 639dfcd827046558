//! Currencies supported by the Steam Community Market.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumString};

/// A currency on the Steam Community Market. The discriminants are Steam's proprietary numeric
/// currency identifiers as used by the `priceoverview` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoPrimitive, TryFromPrimitive)]
#[strum(ascii_case_insensitive)]
#[repr(u32)]
pub enum Currency {
    USD = 1,
    GBP = 2,
    EUR = 3,
    CHF = 4,
    RUB = 5,
    PLN = 6,
    BRL = 7,
    JPY = 8,
    NOK = 9,
    IDR = 10,
    MYR = 11,
    PHP = 12,
    SGD = 13,
    THB = 14,
    VND = 15,
    KRW = 16,
    TRY = 17,
    UAH = 18,
    MXN = 19,
    CAD = 20,
    AUD = 21,
    NZD = 22,
    CNY = 23,
    INR = 24,
    CLP = 25,
    PEN = 26,
    COP = 27,
    ZAR = 28,
    HKD = 29,
    TWD = 30,
    SAR = 31,
    AED = 32,
    ARS = 34,
    ILS = 35,
    BYN = 36,
    KZT = 37,
    KWD = 38,
    QAR = 39,
    CRC = 40,
    UYU = 41,
}

impl Currency {
    /// Looks up a currency by its ISO-like code. Unknown codes default to [`Currency::USD`].
    pub fn from_code(code: &str) -> Self {
        code.trim().parse::<Currency>().unwrap_or(Currency::USD)
    }

    /// The numeric currency identifier used in market requests.
    pub fn id(&self) -> u32 {
        u32::from(*self)
    }

    /// The currency symbol, if one is commonly displayed.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Currency::USD | Currency::CAD | Currency::AUD | Currency::NZD |
            Currency::SGD | Currency::HKD | Currency::MXN | Currency::ARS |
            Currency::CLP | Currency::COP | Currency::TWD | Currency::UYU => Some("$"),
            Currency::GBP => Some("£"),
            Currency::EUR => Some("€"),
            Currency::RUB => Some("₽"),
            Currency::BRL => Some("R$"),
            Currency::JPY | Currency::CNY => Some("¥"),
            Currency::KRW => Some("₩"),
            Currency::TRY => Some("₺"),
            Currency::UAH => Some("₴"),
            Currency::INR => Some("₹"),
            Currency::PLN => Some("zł"),
            Currency::VND => Some("₫"),
            Currency::THB => Some("฿"),
            Currency::PHP => Some("₱"),
            Currency::ILS => Some("₪"),
            Currency::ZAR => Some("R"),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_codes_to_ids() {
        assert_eq!(Currency::from_code("USD").id(), 1);
        assert_eq!(Currency::from_code("eur").id(), 3);
        assert_eq!(Currency::from_code("pln").id(), 6);
    }

    #[test]
    fn unknown_codes_default_to_usd() {
        assert_eq!(Currency::from_code("XYZ"), Currency::USD);
        assert_eq!(Currency::from_code(""), Currency::USD);
    }

    #[test]
    fn displays_as_code() {
        assert_eq!(Currency::EUR.to_string(), "EUR");
    }
}
