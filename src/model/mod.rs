pub mod chart_point;
pub mod order_level;
pub mod strategy;
pub mod trade;
