use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use stpc_dashboard::config::{Config, DEFAULT_CONFIG_PATH};
use stpc_dashboard::event::AppEvent;
use stpc_dashboard::input::{parse_key, UiCommand};
use stpc_dashboard::panels::PanelSizes;
use stpc_dashboard::session::{DashboardSinks, Session};
use stpc_dashboard::transport::{HttpTransport, WsConnector};
use stpc_dashboard::ui::{self, DashboardState, FieldEditor, InputsView, SharedDashboard, TableKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let (config, config_found) = match Config::load(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create log file {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    if !config_found {
        tracing::warn!(path = %config_path.display(), "Config file not found, using defaults");
    }
    tracing::info!(
        rest_url = %config.server.rest_base_url,
        ws_url = %config.server.ws_url,
        strategy_id = %config.server.strategy_id,
        "Starting stpc-dashboard"
    );

    let transport = Arc::new(
        HttpTransport::new(&config.server.rest_base_url, config.server.request_timeout())
            .context("failed to build HTTP client")?,
    );
    let connector = Arc::new(WsConnector::new());

    let dashboard = SharedDashboard::new(DashboardState::new(
        &config.server.strategy_id,
        config.chart.capacity,
        config.ui.max_log_messages,
    ));
    let sinks = DashboardSinks {
        bids: dashboard.table_sink(TableKind::Bids),
        asks: dashboard.table_sink(TableKind::Asks),
        trades: dashboard.table_sink(TableKind::Trades),
        chart: Arc::new(dashboard.clone()),
    };

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let session = Session::start(&config, transport, connector, sinks, app_tx);
    dashboard.lock().push_log(format!(
        "stpc-dashboard started | {} | {}",
        config.server.strategy_id, config.server.rest_base_url
    ));

    let mut terminal = ratatui::try_init().context("failed to initialise terminal")?;
    let mut events = EventStream::new();
    let mut render_tick = tokio::time::interval(Duration::from_millis(config.ui.refresh_rate_ms));
    let mut editor = FieldEditor::default();

    let result: Result<()> = loop {
        tokio::select! {
            _ = render_tick.tick() => {
                while let Ok(event) = app_rx.try_recv() {
                    dashboard.lock().apply(event);
                }
                let inputs = InputsView {
                    values: session.fields.values(),
                    focus: session.fields.focused(),
                    draft: editor.draft(),
                    trades_size: *session.sizes.trades.borrow(),
                    bids_size: *session.sizes.bids.borrow(),
                    asks_size: *session.sizes.asks.borrow(),
                };
                let state = dashboard.lock();
                if let Err(e) = terminal.draw(|frame| ui::render(frame, &state, &inputs)) {
                    break Err(e.into());
                }
            }
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                        tracing::info!("Ctrl+C received");
                        break Ok(());
                    }
                    let editing = session.fields.focused().is_some();
                    match parse_key(&key.code, editing) {
                        Some(UiCommand::Quit) => {
                            tracing::info!("User quit");
                            break Ok(());
                        }
                        Some(UiCommand::AdjustTradesSize(delta)) => {
                            let size = PanelSizes::adjust(&session.sizes.trades, delta);
                            dashboard.lock().push_log(format!("Last trades size: {}", size));
                        }
                        Some(UiCommand::AdjustBidsSize(delta)) => {
                            let size = PanelSizes::adjust(&session.sizes.bids, delta);
                            dashboard.lock().push_log(format!("Best bids size: {}", size));
                        }
                        Some(UiCommand::AdjustAsksSize(delta)) => {
                            let size = PanelSizes::adjust(&session.sizes.asks, delta);
                            dashboard.lock().push_log(format!("Best asks size: {}", size));
                        }
                        Some(command) => {
                            if let Some(msg) = editor.handle(command, &session.fields) {
                                dashboard.lock().push_log(msg);
                            }
                        }
                        None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received");
                break Ok(());
            }
        }
    };

    ratatui::restore();
    session.shutdown();
    tracing::info!("Shutdown complete");
    result
}
