use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::trade::{MakerSide, Trade};

pub const SIMULATED_SELL_COLOR: &str = "#00cc00";
pub const SIMULATED_BUY_COLOR: &str = "#cc0000";
pub const SIMULATED_MARKER_SIZE: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    TriangleUp,
    TriangleDown,
}

/// A trade plus its chart decoration.
///
/// Decoration is derived once in [`ChartPoint::from_trade`] and is read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    trade: Trade,
    shape: Option<MarkerShape>,
    color: Option<&'static str>,
    size: Option<u16>,
}

impl ChartPoint {
    pub fn from_trade(trade: Trade) -> Self {
        let (shape, color, size) = if trade.is_simulated() {
            // A simulated SELL maker means the strategy bought from it.
            match trade.maker_side {
                MakerSide::Sell => (
                    Some(MarkerShape::TriangleUp),
                    Some(SIMULATED_SELL_COLOR),
                    Some(SIMULATED_MARKER_SIZE),
                ),
                MakerSide::Buy => (
                    Some(MarkerShape::TriangleDown),
                    Some(SIMULATED_BUY_COLOR),
                    Some(SIMULATED_MARKER_SIZE),
                ),
            }
        } else {
            (None, None, None)
        };

        Self {
            trade,
            shape,
            color,
            size,
        }
    }

    pub fn trade(&self) -> &Trade {
        &self.trade
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.trade.creation_time
    }

    pub fn price(&self) -> Decimal {
        self.trade.price
    }

    pub fn shape(&self) -> Option<MarkerShape> {
        self.shape
    }

    pub fn color(&self) -> Option<&'static str> {
        self.color
    }

    pub fn size(&self) -> Option<u16> {
        self.size
    }
}

impl From<Trade> for ChartPoint {
    fn from(trade: Trade) -> Self {
        Self::from_trade(trade)
    }
}
