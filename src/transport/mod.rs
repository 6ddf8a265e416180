pub mod rest;
pub mod ws;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppResult;

pub use rest::HttpTransport;
pub use ws::WsConnector;

/// Request/response access to the dashboard server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` and decode the body as JSON.
    async fn fetch(&self, path: &str) -> AppResult<Value>;

    /// PUT `body` to `path`. Resolves only once the server has acknowledged the
    /// write (2xx) or the request has failed.
    async fn fetch_and_push(&self, path: &str, body: &Value) -> AppResult<()>;
}

/// Messages of one persistent connection. `Some(Err)` is an error signal; the
/// end of the stream is a close signal.
pub type TradeStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, url: &str) -> AppResult<TradeStream>;
}

pub async fn fetch_as<T: DeserializeOwned>(transport: &dyn Transport, path: &str) -> AppResult<T> {
    let value = transport.fetch(path).await?;
    Ok(serde_json::from_value(value)?)
}

/// Server paths, relative to the REST base URL.
pub mod endpoints {
    pub const EXCHANGE: &str = "/api/v1/exchange";
    pub const STRATEGIES: &str = "/api/v1/strategies";

    pub fn best_asks(size: usize) -> String {
        format!("{}/bestAsks?size={}", EXCHANGE, size)
    }

    pub fn best_bids(size: usize) -> String {
        format!("{}/bestBids?size={}", EXCHANGE, size)
    }

    pub fn last_trades(size: usize, strategy_id: &str) -> String {
        format!(
            "{}/lastTrades?size={}&strategyId={}",
            EXCHANGE, size, strategy_id
        )
    }

    pub fn strategy(strategy_id: &str) -> String {
        format!("{}/{}", STRATEGIES, strategy_id)
    }

    pub fn reconfigure(strategy_id: &str) -> String {
        format!("{}/{}/reconfigure", STRATEGIES, strategy_id)
    }
}
