use async_trait::async_trait;
use futures_util::{future, StreamExt};
use tokio_tungstenite::tungstenite;

use crate::error::{AppError, AppResult};

use super::{StreamConnector, TradeStream};

/// tokio-tungstenite backed connector. Text frames become messages; control
/// and binary frames are dropped.
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StreamConnector for WsConnector {
    async fn connect(&self, url: &str) -> AppResult<TradeStream> {
        let (ws_stream, _resp) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| AppError::WebSocket(e.to_string()))?;

        let messages = ws_stream.filter_map(|msg| {
            future::ready(match msg {
                Ok(tungstenite::Message::Text(text)) => Some(Ok(text.to_string())),
                // tungstenite answers pings itself and ends the stream after Close.
                Ok(_) => None,
                Err(e) => Some(Err(AppError::WebSocket(e.to_string()))),
            })
        });
        Ok(Box::pin(messages))
    }
}
