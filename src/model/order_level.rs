use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price/amount pair of a best-bids or best-asks snapshot.
///
/// Ranking is decided server-side; callers keep the received order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl OrderLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }

    /// Notional value of the level (price x amount).
    pub fn value(&self) -> Decimal {
        self.price.checked_mul(self.amount).unwrap_or(Decimal::MAX)
    }
}
