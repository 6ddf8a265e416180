use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};
use crate::event::{AppEvent, ChartCommand};
use crate::model::trade::Trade;
use crate::sink::ChartSink;
use crate::transport::{StreamConnector, TradeStream};

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2_000);
pub const STREAM_UNAVAILABLE_MESSAGE: &str = "Websocket not available for chart";

pub type StreamHandle = JoinHandle<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSignal {
    ConnectRequested,
    Opened,
    ConnectFailed,
    Errored,
    Closed,
}

impl StreamState {
    /// Transition table of the connection. Signals that make no sense in the
    /// current state leave it unchanged.
    pub fn on_signal(self, signal: StreamSignal) -> Self {
        match (self, signal) {
            (StreamState::Disconnected, StreamSignal::ConnectRequested) => StreamState::Connecting,
            (StreamState::Connecting, StreamSignal::Opened) => StreamState::Connected,
            (StreamState::Connecting, StreamSignal::ConnectFailed) => StreamState::Disconnected,
            (StreamState::Connected, StreamSignal::Errored | StreamSignal::Closed) => {
                StreamState::Disconnected
            }
            (state, _) => state,
        }
    }
}

/// Owns the live trades connection and re-opens it forever, with a fixed
/// delay, after every close, error or failed connect.
pub struct LiveStreamClient {
    url: String,
    reconnect_delay: Duration,
    connector: Arc<dyn StreamConnector>,
    chart_tx: mpsc::Sender<ChartCommand>,
    event_tx: mpsc::Sender<AppEvent>,
    state_tx: watch::Sender<StreamState>,
}

impl LiveStreamClient {
    /// Fails with [`AppError::StreamUnavailable`] when the endpoint cannot be
    /// used at all. That failure is terminal: no connection loop is started.
    pub fn new(
        url: &str,
        reconnect_delay: Duration,
        connector: Arc<dyn StreamConnector>,
        chart_tx: mpsc::Sender<ChartCommand>,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> AppResult<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| AppError::StreamUnavailable(format!("invalid url '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(AppError::StreamUnavailable(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                url
            )));
        }

        let (state_tx, _) = watch::channel(StreamState::Disconnected);
        Ok(Self {
            url: url.to_string(),
            reconnect_delay,
            connector,
            chart_tx,
            event_tx,
            state_tx,
        })
    }

    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state_tx.subscribe()
    }

    pub fn spawn(self) -> StreamHandle {
        tokio::spawn(self.run())
    }

    /// Runs until the chart synchronizer goes away.
    pub async fn run(self) {
        tracing::info!(url = %self.url, "Starting live trades stream");
        let mut state = StreamState::Disconnected;
        let mut attempt: u32 = 0;

        loop {
            state = self.transition(state, StreamSignal::ConnectRequested);
            attempt = attempt.saturating_add(1);

            match self.connector.connect(&self.url).await {
                Ok(stream) => {
                    state = self.transition(state, StreamSignal::Opened);
                    attempt = 0;
                    tracing::info!(url = %self.url, "Live trades stream connected");

                    // Rebuild from history so the window never depends on live
                    // messages alone after a gap.
                    if self.chart_tx.send(ChartCommand::Resync).await.is_err() {
                        tracing::info!("Chart channel closed, stream task exiting");
                        return;
                    }

                    match self.pump(stream).await {
                        Some(signal) => state = self.transition(state, signal),
                        None => {
                            tracing::info!("Chart channel closed, stream task exiting");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, attempt, error = %e, "Live trades connect failed");
                    state = self.transition(state, StreamSignal::ConnectFailed);
                }
            }

            let delay_ms = self.reconnect_delay.as_millis() as u64;
            let _ = self.event_tx.try_send(AppEvent::StreamReconnecting {
                attempt: attempt.saturating_add(1),
                delay_ms,
            });
            tracing::debug!(delay_ms, "Waiting before reconnecting");
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// Forwards messages until the connection errors or closes. Returns `None`
    /// when the chart side has hung up.
    async fn pump(&self, mut stream: TradeStream) -> Option<StreamSignal> {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(text) => match serde_json::from_str::<Trade>(&text) {
                    Ok(trade) => {
                        if self
                            .chart_tx
                            .send(ChartCommand::Append(vec![trade]))
                            .await
                            .is_err()
                        {
                            return None;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, raw = %text, "Dropping malformed trade message");
                        let _ = self
                            .event_tx
                            .try_send(AppEvent::MessageRejected(e.to_string()));
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Live trades stream error");
                    return Some(StreamSignal::Errored);
                }
            }
        }
        tracing::info!("Live trades stream closed by server");
        Some(StreamSignal::Closed)
    }

    fn transition(&self, state: StreamState, signal: StreamSignal) -> StreamState {
        let next = state.on_signal(signal);
        if next != state {
            tracing::debug!(from = ?state, to = ?next, ?signal, "Stream state change");
            self.state_tx.send_replace(next);
            let _ = self.event_tx.try_send(AppEvent::StreamState(next));
        }
        next
    }
}

/// Spawns the stream loop, or shows the unavailable message on the chart when
/// the client could not be built.
pub fn spawn_or_fallback(
    client: AppResult<LiveStreamClient>,
    chart_sink: &dyn ChartSink,
) -> Option<(StreamHandle, watch::Receiver<StreamState>)> {
    match client {
        Ok(client) => {
            let state_rx = client.subscribe_state();
            Some((client.spawn(), state_rx))
        }
        Err(e) => {
            tracing::error!(error = %e, "Live trades stream unavailable");
            chart_sink.show_unavailable(STREAM_UNAVAILABLE_MESSAGE);
            None
        }
    }
}
