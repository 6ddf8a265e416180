use crate::model::strategy::StrategyParams;
use crate::model::trade::Trade;
use crate::stream::StreamState;

/// Commands accepted by the chart synchronizer, the only owner of the trade
/// window.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartCommand {
    /// Refetch history and replace the whole window.
    Resync,
    /// Append live trades at the end of the window.
    Append(Vec<Trade>),
}

/// Notifications for the dashboard's status bar and log panel.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    StreamState(StreamState),
    StreamReconnecting { attempt: u32, delay_ms: u64 },
    MessageRejected(String),
    FetchFailed { source: String, error: String },
    RemoteConfigApplied(StrategyParams),
    ConfigPushed(StrategyParams),
    ConfigPushFailed(String),
    LogMessage(String),
}
