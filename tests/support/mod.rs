#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::time::Instant;

use stpc_dashboard::error::{AppError, AppResult};
use stpc_dashboard::format::TableRow;
use stpc_dashboard::model::chart_point::ChartPoint;
use stpc_dashboard::model::trade::{MakerSide, Trade};
use stpc_dashboard::sink::{ChartSink, TableSink};
use stpc_dashboard::transport::{StreamConnector, Transport, TradeStream};

pub fn trade(id: u32, price: i64, side: MakerSide, simulated: bool) -> Trade {
    let tags = simulated.then(|| {
        let mut tags = HashMap::new();
        tags.insert("SIMULATED_BY".to_string(), json!("contrarian1"));
        tags
    });
    Trade {
        trade_id: format!("T{}", id),
        creation_time: Utc
            .timestamp_millis_opt(1_521_046_931_000 + i64::from(id) * 1_000)
            .unwrap(),
        price: Decimal::from(price),
        amount: Decimal::new(125, 4),
        maker_side: side,
        tags,
    }
}

pub fn plain_trade(id: u32) -> Trade {
    trade(id, 100 + i64::from(id), MakerSide::Buy, false)
}

pub fn ids(points: &[ChartPoint]) -> Vec<String> {
    points.iter().map(|p| p.trade().trade_id.clone()).collect()
}

#[derive(Debug, Clone)]
struct Scripted {
    body: Result<Value, u16>,
    delay: Duration,
}

/// Scripted in-memory server. Each path answers from a queue; the last entry
/// is sticky. Unknown paths answer 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    failing_pushes: Mutex<HashSet<String>>,
    log: Mutex<Vec<String>>,
    puts: Mutex<Vec<(String, Value)>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.script(path, Ok(body), Duration::ZERO);
    }

    pub fn respond_after(&self, path: &str, body: Value, delay: Duration) {
        self.script(path, Ok(body), delay);
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.script(path, Err(status), Duration::ZERO);
    }

    /// Replaces everything scripted for `path`.
    pub fn reset(&self, path: &str) {
        self.responses.lock().remove(path);
    }

    pub fn fail_push(&self, path: &str) {
        self.failing_pushes.lock().insert(path.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|entry| entry.strip_prefix("GET ").map(str::to_string))
            .collect()
    }

    pub fn puts(&self) -> Vec<(String, Value)> {
        self.puts.lock().clone()
    }

    fn script(&self, path: &str, body: Result<Value, u16>, delay: Duration) {
        self.responses
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Scripted { body, delay });
    }

    fn next(&self, path: &str) -> Option<Scripted> {
        let mut responses = self.responses.lock();
        let queue = responses.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, path: &str) -> AppResult<Value> {
        self.log.lock().push(format!("GET {}", path));
        let scripted = self.next(path).ok_or_else(|| AppError::Status {
            status: 404,
            url: path.to_string(),
        })?;
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.body.map_err(|status| AppError::Status {
            status,
            url: path.to_string(),
        })
    }

    async fn fetch_and_push(&self, path: &str, body: &Value) -> AppResult<()> {
        self.log.lock().push(format!("PUT {}", path));
        if self.failing_pushes.lock().contains(path) {
            return Err(AppError::Status {
                status: 500,
                url: path.to_string(),
            });
        }
        self.puts.lock().push((path.to_string(), body.clone()));
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConnectOutcome {
    Fail,
    /// Deliver these messages, then close.
    Messages(Vec<AppResult<String>>),
    /// Stay open forever.
    Hold,
}

/// Scripted stream endpoint that records when each connect was attempted.
pub struct FakeConnector {
    outcomes: Mutex<VecDeque<ConnectOutcome>>,
    attempts: Mutex<Vec<Instant>>,
}

impl FakeConnector {
    pub fn new(outcomes: Vec<ConnectOutcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }

    /// Attempt times in milliseconds after `start`.
    pub fn attempt_offsets_ms(&self, start: Instant) -> Vec<u128> {
        self.attempts
            .lock()
            .iter()
            .map(|t| t.duration_since(start).as_millis())
            .collect()
    }
}

#[async_trait]
impl StreamConnector for FakeConnector {
    async fn connect(&self, _url: &str) -> AppResult<TradeStream> {
        self.attempts.lock().push(Instant::now());
        let outcome = self.outcomes.lock().pop_front().unwrap_or(ConnectOutcome::Fail);
        match outcome {
            ConnectOutcome::Fail => Err(AppError::WebSocket("connection refused".to_string())),
            ConnectOutcome::Messages(messages) => Ok(Box::pin(futures_util::stream::iter(messages))),
            ConnectOutcome::Hold => Ok(Box::pin(futures_util::stream::pending::<AppResult<String>>())),
        }
    }
}

#[derive(Default)]
pub struct RecordingTableSink {
    calls: Mutex<Vec<Vec<TableRow>>>,
}

impl RecordingTableSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last(&self) -> Option<Vec<TableRow>> {
        self.calls.lock().last().cloned()
    }
}

impl TableSink for RecordingTableSink {
    fn replace_rows(&self, rows: Vec<TableRow>) {
        self.calls.lock().push(rows);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartCall {
    Set(Vec<ChartPoint>),
    Append(Vec<ChartPoint>),
    Unavailable(String),
}

#[derive(Default)]
pub struct RecordingChartSink {
    calls: Mutex<Vec<ChartCall>>,
}

impl RecordingChartSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ChartCall> {
        self.calls.lock().clone()
    }
}

impl ChartSink for RecordingChartSink {
    fn set_points(&self, points: Vec<ChartPoint>) {
        self.calls.lock().push(ChartCall::Set(points));
    }

    fn append_points(&self, points: Vec<ChartPoint>) {
        self.calls.lock().push(ChartCall::Append(points));
    }

    fn show_unavailable(&self, message: &str) {
        self.calls.lock().push(ChartCall::Unavailable(message.to_string()));
    }
}
