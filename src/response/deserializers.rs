//! Custom deserialization functions for Steam's string-encoded values.

use super::{Description, DescriptionMap};
use crate::types::Amount;
use std::fmt;
use std::str::FromStr;
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};

pub fn from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr,
    T::Err: fmt::Display,
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    T::from_str(&s).map_err(de::Error::custom)
}

/// Accepts a bool, an integer, or a numeric string; anything non-zero is `true`.
pub fn into_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl<'de> Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean or an integer")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v != "0" && !v.is_empty())
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

/// Instance IDs come over the wire as strings, with `"0"` meaning no specific instance.
pub fn option_str_0_as_none<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let value = s.parse::<u64>().map_err(de::Error::custom)?;

    match value {
        0 => Ok(None),
        value => Ok(Some(value)),
    }
}

pub fn one() -> Amount {
    1
}

/// Parses a stack amount from a string or number. Unparsable or zero amounts collapse to `1` -
/// an owned asset always has a quantity of at least one.
pub fn amount_or_one<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an amount as a string or an integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Amount::try_from(v).unwrap_or(1).max(1))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.parse::<Amount>().unwrap_or(1).max(1))
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

/// Builds a map keyed by (classid, instanceid) from the sequence of descriptions in an
/// inventory payload.
pub fn to_description_map<'de, D>(deserializer: D) -> Result<DescriptionMap, D::Error>
where
    D: Deserializer<'de>,
{
    struct DescriptionVisitor;

    impl<'de> Visitor<'de> for DescriptionVisitor {
        type Value = DescriptionMap;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of descriptions")
        }

        fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
        where
            V: SeqAccess<'de>,
        {
            let mut map = DescriptionMap::with_capacity(seq.size_hint().unwrap_or(0));

            while let Some(description) = seq.next_element::<Description>()? {
                map.insert((description.classid, description.instanceid), description);
            }

            Ok(map)
        }
    }

    deserializer.deserialize_seq(DescriptionVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct AmountContainer {
        #[serde(deserialize_with = "amount_or_one")]
        amount: Amount,
    }

    #[test]
    fn unparsable_amounts_collapse_to_one() {
        let container: AmountContainer = serde_json::from_str(r#"{"amount":"potato"}"#).unwrap();

        assert_eq!(container.amount, 1);
    }

    #[test]
    fn parses_string_amounts() {
        let container: AmountContainer = serde_json::from_str(r#"{"amount":"12"}"#).unwrap();

        assert_eq!(container.amount, 12);
    }
}
