use std::collections::VecDeque;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use rust_decimal::prelude::ToPrimitive;

use crate::model::chart_point::{
    ChartPoint, MarkerShape, SIMULATED_BUY_COLOR, SIMULATED_SELL_COLOR,
};

pub struct TradesChart<'a> {
    points: &'a VecDeque<ChartPoint>,
    unavailable: Option<&'a str>,
}

impl<'a> TradesChart<'a> {
    pub fn new(points: &'a VecDeque<ChartPoint>) -> Self {
        Self {
            points,
            unavailable: None,
        }
    }

    pub fn unavailable(mut self, message: Option<&'a str>) -> Self {
        self.unavailable = message;
        self
    }
}

/// Parses `#rrggbb` into a terminal colour.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Block title naming the simulated trade markers.
pub fn legend_title() -> Line<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let marker = |hex: &str| Style::default().fg(hex_color(hex).unwrap_or(Color::Cyan));
    Line::from(vec![
        Span::raw(" Trades  "),
        Span::styled("▲", marker(SIMULATED_SELL_COLOR)),
        Span::styled(" Simulated Buy  ", label),
        Span::styled("▼", marker(SIMULATED_BUY_COLOR)),
        Span::styled(" Simulated Sell ", label),
    ])
}

fn glyph(point: &ChartPoint) -> (&'static str, Color) {
    let color = point.color().and_then(hex_color).unwrap_or(Color::Cyan);
    match point.shape() {
        Some(MarkerShape::TriangleUp) => ("▲", color),
        Some(MarkerShape::TriangleDown) => ("▼", color),
        None => ("•", color),
    }
}

impl Widget for TradesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(legend_title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);

        if let Some(message) = self.unavailable {
            Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block)
                .render(area, buf);
            return;
        }
        block.render(area, buf);

        if self.points.is_empty() || inner.height < 3 || inner.width < 4 {
            return;
        }

        let chart_height = inner.height.saturating_sub(1) as usize; // last row for the time axis
        let chart_width = inner.width as usize;

        // Most recent points that fit, one column each.
        let skip = self.points.len().saturating_sub(chart_width);
        let visible: Vec<(&ChartPoint, f64)> = self
            .points
            .iter()
            .skip(skip)
            .map(|p| (p, p.price().to_f64().unwrap_or(0.0)))
            .collect();

        let min_price = visible.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max_price = visible.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        let range = max_price - min_price;
        let range = if range < 0.01 { 1.0 } else { range };

        for (i, (point, price)) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let normalized = (price - min_price) / range;
            let y_pos = chart_height - 1
                - ((normalized * (chart_height - 1) as f64) as usize).min(chart_height - 1);
            let y = inner.y + y_pos as u16;
            let (symbol, color) = glyph(point);
            buf.set_string(x, y, symbol, Style::default().fg(color));
        }

        let label_style = Style::default().fg(Color::DarkGray);
        buf.set_string(inner.x, inner.y, format!("{:.2}", max_price), label_style);
        let axis_y = inner.y + inner.height - 1;
        buf.set_string(
            inner.x,
            axis_y.saturating_sub(1),
            format!("{:.2}", min_price),
            label_style,
        );

        if let (Some((first, _)), Some((last, _))) = (visible.first(), visible.last()) {
            let start = first.time().format("%H:%M:%S").to_string();
            let end = last.time().format("%H:%M:%S").to_string();
            buf.set_string(inner.x, axis_y, &start, label_style);
            let end_x = (inner.x + inner.width).saturating_sub(end.len() as u16);
            if end_x > inner.x + start.len() as u16 {
                buf.set_string(end_x, axis_y, &end, label_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_marker_colors() {
        assert_eq!(hex_color("#00cc00"), Some(Color::Rgb(0, 0xcc, 0)));
        assert_eq!(hex_color("#cc0000"), Some(Color::Rgb(0xcc, 0, 0)));
        assert_eq!(hex_color("cc0000"), None);
        assert_eq!(hex_color("#zz0000"), None);
    }

    #[test]
    fn hex_color_rejects_multibyte_input_without_panicking() {
        // Six bytes, but the split points fall inside the two-byte characters.
        assert_eq!(hex_color("#aéaaa"), None);
        assert_eq!(hex_color("#ééé"), None);
    }
}
