use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Tag key the server puts on trades produced by a strategy simulation.
pub const SIMULATED_BY_TAG: &str = "SIMULATED_BY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MakerSide {
    Buy,
    Sell,
}

impl fmt::Display for MakerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MakerSide::Buy => write!(f, "BUY"),
            MakerSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade as served by the last-trades endpoint and the live trades stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(deserialize_with = "string_or_number")]
    pub trade_id: String,
    #[serde(
        rename = "creationDate",
        alias = "creationTime",
        deserialize_with = "rfc3339_or_millis"
    )]
    pub creation_time: DateTime<Utc>,
    pub price: Decimal,
    pub amount: Decimal,
    pub maker_side: MakerSide,
    #[serde(
        rename = "tradeTags",
        alias = "tags",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<HashMap<String, serde_json::Value>>,
}

impl Trade {
    pub fn is_simulated(&self) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.contains_key(SIMULATED_BY_TAG))
    }

    pub fn value(&self) -> Decimal {
        self.price.checked_mul(self.amount).unwrap_or(Decimal::MAX)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid trade id: {}",
            other
        ))),
    }
}

/// Accepts an RFC 3339 timestamp or integer epoch milliseconds.
fn rfc3339_or_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(ms) => Utc.timestamp_millis_opt(ms).single(),
            None => fractional_epoch_seconds(&n.to_string()),
        }
        .ok_or_else(|| serde::de::Error::custom(format!("invalid epoch timestamp: {}", n))),
        _ => Err(serde::de::Error::custom("invalid timestamp")),
    }
}

/// Integer timestamps are epoch millis; decimals such as `1521046931.123`
/// are epoch seconds.
fn fractional_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let seconds = Decimal::from_str(raw).ok()?;
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * Decimal::from(1_000_000_000)).round();
    Utc.timestamp_opt(whole.to_i64()?, nanos.to_u32()?).single()
}
