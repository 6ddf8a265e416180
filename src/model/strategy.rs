use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Remote strategy configuration.
///
/// Only the two tick thresholds are known to this client. Every other field is
/// carried in `other` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    #[serde(deserialize_with = "u32_from_string_or_number")]
    pub consecutive_upticks_to_sell: u32,
    #[serde(deserialize_with = "u32_from_string_or_number")]
    pub consecutive_downticks_to_buy: u32,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Body of `GET <strategies>/{id}`; only `config` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySnapshot {
    pub config: StrategyConfig,
}

/// The user-editable pair of strategy thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyParams {
    pub upticks_to_sell: u32,
    pub downticks_to_buy: u32,
}

impl StrategyParams {
    pub fn new(upticks_to_sell: u32, downticks_to_buy: u32) -> Self {
        Self {
            upticks_to_sell,
            downticks_to_buy,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            upticks_to_sell: config.consecutive_upticks_to_sell,
            downticks_to_buy: config.consecutive_downticks_to_buy,
        }
    }

    /// Writes both thresholds into `config`, leaving every other field alone.
    pub fn apply_to(&self, config: &mut StrategyConfig) {
        config.consecutive_upticks_to_sell = self.upticks_to_sell;
        config.consecutive_downticks_to_buy = self.downticks_to_buy;
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.upticks_to_sell < 1 {
            return Err(AppError::InvalidParam(
                "consecutiveUpticksToSell must be >= 1".to_string(),
            ));
        }
        if self.downticks_to_buy < 1 {
            return Err(AppError::InvalidParam(
                "consecutiveDownticksToBuy must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid threshold: {}", n))),
        Value::String(s) => s.trim().parse::<u32>().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "invalid threshold: {}",
            other
        ))),
    }
}
