use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::chart_sync::ChartSynchronizer;
use crate::config::Config;
use crate::event::{AppEvent, ChartCommand};
use crate::model::strategy::StrategyParams;
use crate::panels::{BookPanel, BookSide, PanelSizes, TradesPanel};
use crate::poller::{DataPoller, PollHandle};
use crate::reconciler::{ConfigReconciler, EditableFields};
use crate::sink::{ChartSink, TableSink};
use crate::stream::{self, LiveStreamClient, StreamHandle, StreamState};
use crate::transport::{StreamConnector, Transport};

const CHART_QUEUE_SIZE: usize = 1024;

pub struct DashboardSinks {
    pub bids: Arc<dyn TableSink>,
    pub asks: Arc<dyn TableSink>,
    pub trades: Arc<dyn TableSink>,
    pub chart: Arc<dyn ChartSink>,
}

/// Everything the UI needs to talk back to a running session.
pub struct Session {
    pub fields: EditableFields,
    pub sizes: PanelSizes,
    pub stream_state: Option<watch::Receiver<StreamState>>,
    pollers: Vec<PollHandle>,
    chart: JoinHandle<()>,
    stream: Option<StreamHandle>,
    reconciler: JoinHandle<()>,
}

impl Session {
    /// Spawns the pollers, the chart synchronizer, the live stream (or its
    /// fallback message) and the config reconciler.
    pub fn start(
        config: &Config,
        transport: Arc<dyn Transport>,
        connector: Arc<dyn StreamConnector>,
        sinks: DashboardSinks,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let strategy_id = config.server.strategy_id.as_str();
        let (chart_tx, chart_rx) = mpsc::channel::<ChartCommand>(CHART_QUEUE_SIZE);

        let chart = ChartSynchronizer::new(
            config.chart.capacity,
            transport.clone(),
            sinks.chart.clone(),
            strategy_id,
            event_tx.clone(),
        )
        .spawn(chart_rx);

        let client = LiveStreamClient::new(
            &config.server.ws_url,
            config.stream.reconnect_delay(),
            connector,
            chart_tx.clone(),
            event_tx.clone(),
        );
        let (stream, stream_state) = match stream::spawn_or_fallback(client, sinks.chart.as_ref()) {
            Some((handle, state_rx)) => (Some(handle), Some(state_rx)),
            None => (None, None),
        };

        let sizes = PanelSizes::new(
            config.panels.trades_size,
            config.panels.bids_size,
            config.panels.asks_size,
        );
        let trades_size = sizes.trades.subscribe();
        let bids_size = sizes.bids.subscribe();
        let asks_size = sizes.asks.subscribe();

        let pollers = vec![
            DataPoller::schedule_with_trigger(
                config.polling.trades_interval(),
                Arc::new(TradesPanel::new(
                    transport.clone(),
                    sinks.trades,
                    trades_size.clone(),
                    strategy_id,
                )),
                trades_size,
            ),
            DataPoller::schedule_with_trigger(
                config.polling.asks_interval(),
                Arc::new(BookPanel::new(
                    BookSide::Asks,
                    transport.clone(),
                    sinks.asks,
                    asks_size.clone(),
                )),
                asks_size,
            ),
            DataPoller::schedule_with_trigger(
                config.polling.bids_interval(),
                Arc::new(BookPanel::new(
                    BookSide::Bids,
                    transport.clone(),
                    sinks.bids,
                    bids_size.clone(),
                )),
                bids_size,
            ),
        ];

        let (fields, edits) = EditableFields::new(StrategyParams::default());
        let reconciler = ConfigReconciler::new(
            transport,
            fields.clone(),
            strategy_id,
            config.polling.config_interval(),
            chart_tx,
            event_tx,
        )
        .spawn(edits);

        tracing::info!(
            strategy_id,
            stream_enabled = stream.is_some(),
            "Dashboard session started"
        );

        Self {
            fields,
            sizes,
            stream_state,
            pollers,
            chart,
            stream,
            reconciler,
        }
    }

    /// Session teardown; the only point where tasks are stopped.
    pub fn shutdown(self) {
        for poller in self.pollers {
            poller.abort();
        }
        if let Some(stream) = self.stream {
            stream.abort();
        }
        self.reconciler.abort();
        self.chart.abort();
        tracing::info!("Dashboard session stopped");
    }
}
