//! Typed clients for the external data providers.
//!
//! One client per provider role: the graduated-token index, the trading-pair
//! index, the holder registry, and the swap feed. Every public operation
//! fails soft — timeouts, auth failures, and malformed payloads all produce
//! the operation's "absent" sentinel (empty list, `None`, zeroed struct) and
//! a log line, never an error to the caller.

pub mod client;
pub mod graduated;
pub mod holders;
pub mod manager;
pub mod pairs;
pub mod stats;
pub mod swaps;

pub use manager::ApiManager;

use serde::{Deserialize, Deserializer};

/// Deserialize a numeric field that a provider may encode as a number or a
/// string (or omit entirely).
pub fn flex_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    let value: Option<NumOrStr> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumOrStr::Num(n)) => Some(n),
        Some(NumOrStr::Str(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

/// Same, for integer counts.
pub fn flex_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Float(f64),
        Str(String),
    }

    let value: Option<NumOrStr> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumOrStr::Num(n)) => Some(n),
        Some(NumOrStr::Float(f)) => Some(f as i64),
        Some(NumOrStr::Str(s)) => s.trim().parse::<i64>().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::flex_f64")]
        value: Option<f64>,
        #[serde(default, deserialize_with = "super::flex_i64")]
        count: Option<i64>,
    }

    #[test]
    fn flexible_numbers_parse_both_encodings() {
        let a: Probe = serde_json::from_str(r#"{"value": "12.5", "count": "7"}"#).unwrap();
        assert_eq!(a.value, Some(12.5));
        assert_eq!(a.count, Some(7));

        let b: Probe = serde_json::from_str(r#"{"value": 3.0, "count": 9}"#).unwrap();
        assert_eq!(b.value, Some(3.0));
        assert_eq!(b.count, Some(9));

        let c: Probe = serde_json::from_str(r#"{"value": "garbage"}"#).unwrap();
        assert_eq!(c.value, None);
        assert_eq!(c.count, None);
    }
}
