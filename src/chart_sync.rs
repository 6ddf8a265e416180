use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::buffer::SlidingWindowBuffer;
use crate::event::{AppEvent, ChartCommand};
use crate::model::trade::Trade;
use crate::sink::ChartSink;
use crate::transport::{endpoints, fetch_as, Transport};

/// Sole owner of the trade window. Resync and append commands are applied
/// one at a time in arrival order, so an append queued behind a resync lands
/// after the history snapshot.
pub struct ChartSynchronizer {
    buffer: SlidingWindowBuffer,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ChartSink>,
    strategy_id: String,
    event_tx: mpsc::Sender<AppEvent>,
}

impl ChartSynchronizer {
    pub fn new(
        capacity: usize,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ChartSink>,
        strategy_id: &str,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            buffer: SlidingWindowBuffer::new(capacity),
            transport,
            sink,
            strategy_id: strategy_id.to_string(),
            event_tx,
        }
    }

    pub fn buffer(&self) -> &SlidingWindowBuffer {
        &self.buffer
    }

    pub fn spawn(self, commands: mpsc::Receiver<ChartCommand>) -> JoinHandle<()> {
        tokio::spawn(self.run(commands))
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<ChartCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        tracing::info!("Chart command channel closed, chart task exiting");
    }

    pub async fn handle(&mut self, command: ChartCommand) {
        match command {
            ChartCommand::Resync => self.resync().await,
            ChartCommand::Append(trades) => {
                let appended = self.buffer.append(trades);
                if !appended.is_empty() {
                    self.sink.append_points(appended);
                }
            }
        }
    }

    async fn resync(&mut self) {
        let path = endpoints::last_trades(self.buffer.capacity(), &self.strategy_id);
        match fetch_as::<Vec<Trade>>(self.transport.as_ref(), &path).await {
            Ok(history) => {
                let count = history.len();
                let points = self.buffer.resync(history, true);
                tracing::debug!(count, kept = points.len(), "Chart resynchronized from history");
                self.sink.set_points(points);
            }
            Err(e) => {
                tracing::warn!(error = %e, "History fetch failed, keeping current chart");
                let _ = self.event_tx.try_send(AppEvent::FetchFailed {
                    source: "chart history".to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}
