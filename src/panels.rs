use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AppResult;
use crate::format::{format_order_levels, format_trades};
use crate::model::order_level::OrderLevel;
use crate::model::trade::Trade;
use crate::poller::PollAction;
use crate::sink::TableSink;
use crate::transport::{endpoints, fetch_as, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Bids,
    Asks,
}

impl BookSide {
    fn path(self, size: usize) -> String {
        match self {
            BookSide::Bids => endpoints::best_bids(size),
            BookSide::Asks => endpoints::best_asks(size),
        }
    }
}

/// Best bids or best asks table.
pub struct BookPanel {
    side: BookSide,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn TableSink>,
    size: watch::Receiver<usize>,
}

impl BookPanel {
    pub fn new(
        side: BookSide,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn TableSink>,
        size: watch::Receiver<usize>,
    ) -> Self {
        Self {
            side,
            transport,
            sink,
            size,
        }
    }
}

#[async_trait]
impl PollAction for BookPanel {
    fn name(&self) -> &str {
        match self.side {
            BookSide::Bids => "best-bids",
            BookSide::Asks => "best-asks",
        }
    }

    async fn run(&self) -> AppResult<()> {
        let size = *self.size.borrow();
        let levels: Vec<OrderLevel> =
            fetch_as(self.transport.as_ref(), &self.side.path(size)).await?;
        self.sink.replace_rows(format_order_levels(&levels));
        Ok(())
    }
}

/// Last trades table, including the strategy's simulated trades.
pub struct TradesPanel {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn TableSink>,
    size: watch::Receiver<usize>,
    strategy_id: String,
}

impl TradesPanel {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn TableSink>,
        size: watch::Receiver<usize>,
        strategy_id: &str,
    ) -> Self {
        Self {
            transport,
            sink,
            size,
            strategy_id: strategy_id.to_string(),
        }
    }
}

#[async_trait]
impl PollAction for TradesPanel {
    fn name(&self) -> &str {
        "last-trades"
    }

    async fn run(&self) -> AppResult<()> {
        let size = *self.size.borrow();
        let path = endpoints::last_trades(size, &self.strategy_id);
        let trades: Vec<Trade> = fetch_as(self.transport.as_ref(), &path).await?;
        self.sink.replace_rows(format_trades(&trades));
        Ok(())
    }
}

/// Requested page sizes of the three table panels. Changing one re-runs that
/// panel's poll immediately.
pub struct PanelSizes {
    pub trades: watch::Sender<usize>,
    pub bids: watch::Sender<usize>,
    pub asks: watch::Sender<usize>,
}

impl PanelSizes {
    pub fn new(trades: usize, bids: usize, asks: usize) -> Self {
        Self {
            trades: watch::channel(trades.max(1)).0,
            bids: watch::channel(bids.max(1)).0,
            asks: watch::channel(asks.max(1)).0,
        }
    }

    /// Adds `delta` to a size, never going below 1. Returns the new size.
    pub fn adjust(sender: &watch::Sender<usize>, delta: isize) -> usize {
        let mut updated = 1;
        sender.send_modify(|size| {
            *size = size.saturating_add_signed(delta).max(1);
            updated = *size;
        });
        updated
    }
}
