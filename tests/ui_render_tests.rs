mod support;

use ratatui::backend::TestBackend;
use ratatui::Terminal;

use stpc_dashboard::event::AppEvent;
use stpc_dashboard::format::format_trades;
use stpc_dashboard::input::UiCommand;
use stpc_dashboard::model::strategy::StrategyParams;
use stpc_dashboard::model::trade::MakerSide;
use stpc_dashboard::reconciler::{EditableField, EditableFields};
use stpc_dashboard::sink::{ChartSink, TableSink};
use stpc_dashboard::stream::{StreamState, STREAM_UNAVAILABLE_MESSAGE};
use stpc_dashboard::ui::{self, DashboardState, FieldEditor, InputsView, SharedDashboard, TableKind};

use support::{plain_trade, trade};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn inputs(values: StrategyParams) -> InputsView<'static> {
    InputsView {
        values,
        focus: None,
        draft: "",
        trades_size: 10,
        bids_size: 10,
        asks_size: 10,
    }
}

fn render(state: &DashboardState, view: &InputsView<'_>) -> String {
    let backend = TestBackend::new(140, 45);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state, view))
        .expect("render should succeed");
    buffer_text(&terminal)
}

#[test]
/// Verifies the chart fallback:
/// an unavailable stream must replace the chart body with the fixed message.
fn render_unavailable_chart_message() {
    let dashboard = SharedDashboard::new(DashboardState::new("contrarian1", 100, 50));
    dashboard.show_unavailable(STREAM_UNAVAILABLE_MESSAGE);

    let text = render(&dashboard.lock(), &inputs(StrategyParams::default()));
    assert!(text.contains("Websocket not available for chart"));
}

#[test]
/// Verifies table sinks write into their own panel and render with the
/// simulated marker.
fn render_trade_rows_and_strategy_values() {
    let dashboard = SharedDashboard::new(DashboardState::new("contrarian1", 100, 50));
    dashboard
        .table_sink(TableKind::Trades)
        .replace_rows(format_trades(&[trade(1, 190_000, MakerSide::Sell, true)]));

    {
        let state = dashboard.lock();
        assert_eq!(state.trades.len(), 1);
        assert!(state.bids.is_empty());
        assert!(state.asks.is_empty());
    }

    let text = render(&dashboard.lock(), &inputs(StrategyParams::new(3, 2)));
    assert!(text.contains("$190,000.00"));
    assert!(text.contains("(S)"));
    assert!(text.contains("Consecutive upticks to sell:  3"));
    assert!(text.contains("contrarian1"));
    assert!(text.contains("Waiting for data"));
}

#[test]
/// Verifies the chart title names both simulated trade markers.
fn render_chart_legend() {
    let dashboard = SharedDashboard::new(DashboardState::new("contrarian1", 100, 50));
    dashboard.set_points(vec![
        trade(1, 100, MakerSide::Sell, true).into(),
        trade(2, 101, MakerSide::Buy, true).into(),
    ]);

    let text = render(&dashboard.lock(), &inputs(StrategyParams::new(3, 2)));
    assert!(text.contains("▲ Simulated Buy"));
    assert!(text.contains("▼ Simulated Sell"));
}

#[test]
/// Verifies the chart sink mirror never grows past the window capacity.
fn chart_sink_truncates_to_capacity() {
    let dashboard = SharedDashboard::new(DashboardState::new("contrarian1", 3, 50));
    dashboard.set_points((1..=5).map(|id| plain_trade(id).into()).collect());
    assert_eq!(dashboard.lock().chart_points.len(), 3);

    dashboard.append_points(vec![plain_trade(6).into(), plain_trade(7).into()]);
    let state = dashboard.lock();
    let ids: Vec<&str> = state
        .chart_points
        .iter()
        .map(|p| p.trade().trade_id.as_str())
        .collect();
    assert_eq!(ids, vec!["T5", "T6", "T7"]);
}

#[test]
/// Verifies stream and config events land in the status bar and log panel.
fn dashboard_state_applies_events() {
    let mut state = DashboardState::new("contrarian1", 100, 3);
    state.apply(AppEvent::StreamState(StreamState::Connected));
    assert_eq!(state.stream_state, Some(StreamState::Connected));

    state.apply(AppEvent::ConfigPushed(StrategyParams::new(5, 2)));
    state.apply(AppEvent::ConfigPushFailed("boom".to_string()));
    state.apply(AppEvent::LogMessage("one".to_string()));
    state.apply(AppEvent::LogMessage("two".to_string()));

    assert_eq!(state.log_messages.len(), 3);
    assert!(state.log_messages[0].starts_with("[ERR] Reconfigure failed"));
    assert_eq!(state.log_messages[2], "two");
}

#[test]
/// Verifies the threshold editor: Tab focuses, digits build a draft and
/// Enter commits one validated edit.
fn field_editor_commits_changed_value() {
    let (fields, mut edits) = EditableFields::new(StrategyParams::new(3, 2));
    let mut editor = FieldEditor::default();

    editor.handle(UiCommand::CycleFocus, &fields);
    assert_eq!(fields.focused(), Some(EditableField::UpticksToSell));
    assert_eq!(editor.draft(), "3");

    editor.handle(UiCommand::Backspace, &fields);
    editor.handle(UiCommand::Digit('7'), &fields);
    let report = editor.handle(UiCommand::Commit, &fields);

    assert!(report.unwrap().contains("set to 7"));
    assert_eq!(fields.values(), StrategyParams::new(7, 2));
    assert_eq!(edits.try_recv().unwrap(), StrategyParams::new(7, 2));
    assert_eq!(fields.focused(), Some(EditableField::UpticksToSell));
}

#[test]
/// Verifies leaving a field commits it, an unchanged value pushes nothing and
/// Esc discards the draft.
fn field_editor_blur_and_cancel() {
    let (fields, mut edits) = EditableFields::new(StrategyParams::new(3, 2));
    let mut editor = FieldEditor::default();

    editor.handle(UiCommand::CycleFocus, &fields);
    editor.handle(UiCommand::CycleFocus, &fields);
    assert_eq!(fields.focused(), Some(EditableField::DownticksToBuy));
    assert!(edits.try_recv().is_err());

    editor.handle(UiCommand::Digit('4'), &fields);
    editor.handle(UiCommand::CycleFocus, &fields);
    assert_eq!(fields.focused(), None);
    assert_eq!(fields.values(), StrategyParams::new(3, 24));
    assert_eq!(edits.try_recv().unwrap(), StrategyParams::new(3, 24));

    editor.handle(UiCommand::CycleFocus, &fields);
    editor.handle(UiCommand::Digit('9'), &fields);
    editor.handle(UiCommand::Cancel, &fields);
    assert_eq!(fields.focused(), None);
    assert_eq!(fields.values(), StrategyParams::new(3, 24));
    assert!(edits.try_recv().is_err());
}

#[test]
/// Verifies zero is refused and leaves the field unchanged.
fn field_editor_rejects_zero() {
    let (fields, mut edits) = EditableFields::new(StrategyParams::new(3, 2));
    let mut editor = FieldEditor::default();

    editor.handle(UiCommand::CycleFocus, &fields);
    editor.handle(UiCommand::Backspace, &fields);
    editor.handle(UiCommand::Digit('0'), &fields);
    let report = editor.handle(UiCommand::Commit, &fields).unwrap();

    assert!(report.starts_with("[ERR]"));
    assert_eq!(fields.values(), StrategyParams::new(3, 2));
    assert!(edits.try_recv().is_err());
}
