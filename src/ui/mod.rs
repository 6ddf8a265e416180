pub mod chart;
pub mod dashboard;

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::event::AppEvent;
use crate::format::TableRow;
use crate::input::UiCommand;
use crate::model::chart_point::ChartPoint;
use crate::model::strategy::StrategyParams;
use crate::reconciler::{EditableField, EditableFields};
use crate::sink::{ChartSink, TableSink};
use crate::stream::StreamState;

use chart::TradesChart;
use dashboard::{KeybindBar, LogPanel, OrderTable, StatusBar, StrategyPanel};

pub struct DashboardState {
    pub strategy_id: String,
    pub bids: Vec<TableRow>,
    pub asks: Vec<TableRow>,
    pub trades: Vec<TableRow>,
    pub chart_points: VecDeque<ChartPoint>,
    pub chart_capacity: usize,
    pub chart_unavailable: Option<String>,
    pub stream_state: Option<StreamState>,
    pub log_messages: Vec<String>,
    max_log_messages: usize,
}

impl DashboardState {
    pub fn new(strategy_id: &str, chart_capacity: usize, max_log_messages: usize) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            bids: Vec::new(),
            asks: Vec::new(),
            trades: Vec::new(),
            chart_points: VecDeque::with_capacity(chart_capacity),
            chart_capacity: chart_capacity.max(1),
            chart_unavailable: None,
            stream_state: None,
            log_messages: Vec::new(),
            max_log_messages: max_log_messages.max(1),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > self.max_log_messages {
            let excess = self.log_messages.len() - self.max_log_messages;
            self.log_messages.drain(..excess);
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::StreamState(state) => {
                self.stream_state = Some(state);
                match state {
                    StreamState::Connected => self.push_log("Trades stream connected".to_string()),
                    StreamState::Disconnected => {
                        self.push_log("[WARN] Trades stream disconnected".to_string())
                    }
                    StreamState::Connecting => {}
                }
            }
            AppEvent::StreamReconnecting { attempt, delay_ms } => {
                self.push_log(format!(
                    "[WARN] Reconnecting (attempt {}, wait {}ms)",
                    attempt, delay_ms
                ));
            }
            AppEvent::MessageRejected(error) => {
                self.push_log(format!("[ERR] Dropped trade message: {}", error));
            }
            AppEvent::FetchFailed { source, error } => {
                self.push_log(format!("[WARN] {} fetch failed: {}", source, error));
            }
            AppEvent::RemoteConfigApplied(params) => {
                self.push_log(format!(
                    "Strategy config changed remotely: upticks={} downticks={}",
                    params.upticks_to_sell, params.downticks_to_buy
                ));
            }
            AppEvent::ConfigPushed(params) => {
                self.push_log(format!(
                    "Strategy reconfigured: upticks={} downticks={}",
                    params.upticks_to_sell, params.downticks_to_buy
                ));
            }
            AppEvent::ConfigPushFailed(error) => {
                self.push_log(format!("[ERR] Reconfigure failed: {}", error));
            }
            AppEvent::LogMessage(msg) => self.push_log(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Bids,
    Asks,
    Trades,
}

/// Dashboard state shared between the render loop and the sinks.
#[derive(Clone)]
pub struct SharedDashboard {
    state: Arc<Mutex<DashboardState>>,
}

impl SharedDashboard {
    pub fn new(state: DashboardState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock()
    }

    pub fn table_sink(&self, kind: TableKind) -> Arc<dyn TableSink> {
        Arc::new(TableSlot {
            dashboard: self.clone(),
            kind,
        })
    }
}

struct TableSlot {
    dashboard: SharedDashboard,
    kind: TableKind,
}

impl TableSink for TableSlot {
    fn replace_rows(&self, rows: Vec<TableRow>) {
        let mut state = self.dashboard.lock();
        match self.kind {
            TableKind::Bids => state.bids = rows,
            TableKind::Asks => state.asks = rows,
            TableKind::Trades => state.trades = rows,
        }
    }
}

impl ChartSink for SharedDashboard {
    fn set_points(&self, points: Vec<ChartPoint>) {
        let mut state = self.lock();
        state.chart_points = points.into();
        let capacity = state.chart_capacity;
        while state.chart_points.len() > capacity {
            state.chart_points.pop_front();
        }
    }

    fn append_points(&self, points: Vec<ChartPoint>) {
        let mut state = self.lock();
        state.chart_points.extend(points);
        let capacity = state.chart_capacity;
        while state.chart_points.len() > capacity {
            state.chart_points.pop_front();
        }
    }

    fn show_unavailable(&self, message: &str) {
        self.lock().chart_unavailable = Some(message.to_string());
    }
}

/// Text-input behaviour of the two threshold fields.
///
/// Leaving a field with a changed value, or pressing Enter, commits it.
/// Esc discards the draft.
#[derive(Debug, Default)]
pub struct FieldEditor {
    draft: String,
}

impl FieldEditor {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Applies an editing command. Returns a line for the log panel when
    /// something worth reporting happened.
    pub fn handle(&mut self, command: UiCommand, fields: &EditableFields) -> Option<String> {
        match command {
            UiCommand::CycleFocus => {
                let report = self.commit_if_changed(fields);
                let next = match fields.focused() {
                    None => Some(EditableField::UpticksToSell),
                    Some(EditableField::UpticksToSell) => Some(EditableField::DownticksToBuy),
                    Some(EditableField::DownticksToBuy) => None,
                };
                self.focus(next, fields);
                report
            }
            UiCommand::Digit(c) => {
                if self.draft.len() < 9 {
                    self.draft.push(c);
                }
                None
            }
            UiCommand::Backspace => {
                self.draft.pop();
                None
            }
            UiCommand::Commit => {
                let report = self.commit_if_changed(fields);
                if let Some(field) = fields.focused() {
                    self.draft = current_value(fields.values(), field).to_string();
                }
                report
            }
            UiCommand::Cancel => {
                self.focus(None, fields);
                None
            }
            _ => None,
        }
    }

    fn focus(&mut self, field: Option<EditableField>, fields: &EditableFields) {
        self.draft = field
            .map(|f| current_value(fields.values(), f).to_string())
            .unwrap_or_default();
        fields.set_focus(field);
    }

    fn commit_if_changed(&mut self, fields: &EditableFields) -> Option<String> {
        let field = fields.focused()?;
        let current = current_value(fields.values(), field);
        let value = match self.draft.parse::<u32>() {
            Ok(v) => v,
            Err(_) => return Some(format!("[ERR] {}: '{}' is not a number", field.label(), self.draft)),
        };
        if value == current {
            return None;
        }
        match fields.commit(field, value) {
            Ok(_) => Some(format!("{} set to {}", field.label(), value)),
            Err(e) => Some(format!("[ERR] {}", e)),
        }
    }
}

fn current_value(params: StrategyParams, field: EditableField) -> u32 {
    match field {
        EditableField::UpticksToSell => params.upticks_to_sell,
        EditableField::DownticksToBuy => params.downticks_to_buy,
    }
}

/// Per-frame view of the editable inputs; read outside the dashboard lock.
pub struct InputsView<'a> {
    pub values: StrategyParams,
    pub focus: Option<EditableField>,
    pub draft: &'a str,
    pub trades_size: usize,
    pub bids_size: usize,
    pub asks_size: usize,
}

pub fn render(frame: &mut Frame, state: &DashboardState, inputs: &InputsView<'_>) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // status bar
            Constraint::Min(10),    // chart + strategy
            Constraint::Length(14), // tables
            Constraint::Length(5),  // system log
            Constraint::Length(1),  // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            strategy_id: &state.strategy_id,
            stream_state: state.stream_state,
            points: state.chart_points.len(),
            capacity: state.chart_capacity,
        },
        outer[0],
    );

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(36)])
        .split(outer[1]);

    frame.render_widget(
        TradesChart::new(&state.chart_points).unavailable(state.chart_unavailable.as_deref()),
        main_area[0],
    );
    frame.render_widget(
        StrategyPanel {
            values: inputs.values,
            focus: inputs.focus,
            draft: inputs.draft,
        },
        main_area[1],
    );

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(50),
        ])
        .split(outer[2]);

    frame.render_widget(
        OrderTable::book(" Best bids ", &state.bids, inputs.bids_size),
        tables[0],
    );
    frame.render_widget(
        OrderTable::book(" Best asks ", &state.asks, inputs.asks_size),
        tables[1],
    );
    frame.render_widget(
        OrderTable::trades(" Last trades ", &state.trades, inputs.trades_size),
        tables[2],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);
}
