use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::order_level::OrderLevel;
use crate::model::trade::{MakerSide, Trade};

const MONEY_DP: u32 = 2;
const AMOUNT_DP: u32 = 8;
const SIMULATED_SUFFIX: &str = " (S)";

/// One display row of a bids, asks or trades table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub display_price: String,
    pub display_amount: String,
    pub display_value: String,
    pub trade_id: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub maker_side: Option<MakerSide>,
    pub simulated: bool,
}

/// Formats `value` with a fixed number of decimals and `,` thousands separators.
pub fn group_thousands(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(plain.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

pub fn format_money(value: Decimal) -> String {
    let grouped = group_thousands(value, MONEY_DP);
    match grouped.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", grouped),
    }
}

pub fn format_amount(value: Decimal) -> String {
    group_thousands(value, AMOUNT_DP)
}

pub fn format_order_levels(levels: &[OrderLevel]) -> Vec<TableRow> {
    levels
        .iter()
        .map(|level| TableRow {
            display_price: format_money(level.price),
            display_amount: format_amount(level.amount),
            display_value: format_money(level.value()),
            trade_id: None,
            creation_time: None,
            maker_side: None,
            simulated: false,
        })
        .collect()
}

pub fn format_trades(trades: &[Trade]) -> Vec<TableRow> {
    trades
        .iter()
        .map(|trade| {
            let simulated = trade.is_simulated();
            let mut display_value = format_money(trade.value());
            if simulated {
                display_value.push_str(SIMULATED_SUFFIX);
            }
            TableRow {
                display_price: format_money(trade.price),
                display_amount: format_amount(trade.amount),
                display_value,
                trade_id: Some(trade.trade_id.clone()),
                creation_time: Some(trade.creation_time),
                maker_side: Some(trade.maker_side),
                simulated,
            }
        })
        .collect()
}
