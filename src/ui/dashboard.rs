use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::format::TableRow;
use crate::model::strategy::StrategyParams;
use crate::model::trade::MakerSide;
use crate::reconciler::EditableField;
use crate::stream::StreamState;

pub struct OrderTable<'a> {
    title: &'a str,
    rows: &'a [TableRow],
    page_size: usize,
    with_side: bool,
}

impl<'a> OrderTable<'a> {
    pub fn book(title: &'a str, rows: &'a [TableRow], page_size: usize) -> Self {
        Self {
            title,
            rows,
            page_size,
            with_side: false,
        }
    }

    pub fn trades(title: &'a str, rows: &'a [TableRow], page_size: usize) -> Self {
        Self {
            title,
            rows,
            page_size,
            with_side: true,
        }
    }
}

fn row_style(row: &TableRow) -> Style {
    let style = match row.maker_side {
        Some(MakerSide::Buy) => Style::default().fg(Color::Green),
        Some(MakerSide::Sell) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::White),
    };
    if row.simulated {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

impl Widget for OrderTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!("{}[{}] ", self.title, self.page_size))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.rows.is_empty() {
            Paragraph::new(Span::styled(
                "Waiting for data",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block)
            .render(area, buf);
            return;
        }

        let header_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);
        let (header, widths) = if self.with_side {
            (
                Row::new(vec!["Time", "Side", "Price", "Amount", "Value"]).style(header_style),
                vec![
                    Constraint::Length(8),
                    Constraint::Length(4),
                    Constraint::Min(12),
                    Constraint::Min(14),
                    Constraint::Min(14),
                ],
            )
        } else {
            (
                Row::new(vec!["Price", "Amount", "Value"]).style(header_style),
                vec![
                    Constraint::Min(12),
                    Constraint::Min(14),
                    Constraint::Min(12),
                ],
            )
        };

        let rows = self.rows.iter().map(|row| {
            let mut cells = Vec::with_capacity(5);
            if self.with_side {
                cells.push(Cell::from(
                    row.creation_time
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_default(),
                ));
                cells.push(Cell::from(
                    row.maker_side.map(|s| s.to_string()).unwrap_or_default(),
                ));
            }
            cells.push(Cell::from(row.display_price.as_str()));
            cells.push(Cell::from(row.display_amount.as_str()));
            cells.push(Cell::from(row.display_value.as_str()));
            Row::new(cells).style(row_style(row))
        });

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .render(area, buf);
    }
}

pub struct StrategyPanel<'a> {
    pub values: StrategyParams,
    pub focus: Option<EditableField>,
    pub draft: &'a str,
}

impl StrategyPanel<'_> {
    fn field_line(&self, field: EditableField, value: u32) -> Line<'static> {
        let focused = self.focus == Some(field);
        let shown = if focused {
            format!("[{}_]", self.draft)
        } else if value == 0 {
            " -- ".to_string()
        } else {
            format!(" {} ", value)
        };
        let value_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(
                format!("{}: ", field.label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(shown, value_style),
        ])
    }
}

impl Widget for StrategyPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            self.field_line(EditableField::UpticksToSell, self.values.upticks_to_sell),
            self.field_line(EditableField::DownticksToBuy, self.values.downticks_to_buy),
        ];

        let block = Block::default()
            .title(" Strategy ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub strategy_id: &'a str,
    pub stream_state: Option<StreamState>,
    pub points: usize,
    pub capacity: usize,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_status = match self.stream_state {
            Some(StreamState::Connected) => {
                Span::styled("CONNECTED", Style::default().fg(Color::Green))
            }
            Some(StreamState::Connecting) => {
                Span::styled("CONNECTING", Style::default().fg(Color::Yellow))
            }
            Some(StreamState::Disconnected) => {
                Span::styled("DISCONNECTED", Style::default().fg(Color::Red))
            }
            None => Span::styled("NO STREAM", Style::default().fg(Color::DarkGray)),
        };

        let line = Line::from(vec![
            Span::styled(
                " stpc-dashboard ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.strategy_id, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            conn_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("chart: {}/{}", self.points, self.capacity),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::White
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(Color::Yellow);
        let text = Style::default().fg(Color::DarkGray);
        let line = Line::from(vec![
            Span::styled(" [Q]", key),
            Span::styled("uit  ", text),
            Span::styled("[Tab]", key),
            Span::styled(" edit strategy  ", text),
            Span::styled("[Enter]", key),
            Span::styled(" apply  ", text),
            Span::styled("[Esc]", key),
            Span::styled(" cancel  ", text),
            Span::styled("[+/-]", key),
            Span::styled(" trades  ", text),
            Span::styled("[ [ ] ]", key),
            Span::styled(" bids  ", text),
            Span::styled("[{ }]", key),
            Span::styled(" asks", text),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
