//! Read-edit-write reconciliation of the strategy thresholds shown in the
//! dashboard.
//!
//! A periodic pull copies remote values into the fields unless one of them has
//! focus. A committed edit runs GET, merge, PUT and only then asks the chart
//! for a resync. Pull ticks and edits are handled by one task, so a push is
//! always finished before the next pull starts.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::AppResult;
use crate::event::{AppEvent, ChartCommand};
use crate::model::strategy::{StrategyConfig, StrategyParams, StrategySnapshot};
use crate::transport::{endpoints, fetch_as, Transport};

pub const DEFAULT_CONFIG_PULL_INTERVAL: Duration = Duration::from_millis(2_000);
const EDIT_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    UpticksToSell,
    DownticksToBuy,
}

impl EditableField {
    pub fn label(self) -> &'static str {
        match self {
            EditableField::UpticksToSell => "Consecutive upticks to sell",
            EditableField::DownticksToBuy => "Consecutive downticks to buy",
        }
    }
}

/// What the UI shows at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub has_focus: bool,
    pub displayed: StrategyParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullDecision {
    SkipFocused,
    /// An edit was committed while the fetch was in flight.
    SkipEdited,
    Unchanged,
    Overwrite(StrategyParams),
}

pub fn plan_pull(snapshot: &FieldSnapshot, remote: &StrategyConfig) -> PullDecision {
    if snapshot.has_focus {
        return PullDecision::SkipFocused;
    }
    let remote_params = StrategyParams::from_config(remote);
    if remote_params == snapshot.displayed {
        PullDecision::Unchanged
    } else {
        PullDecision::Overwrite(remote_params)
    }
}

/// Puts the displayed thresholds into the remote config. Every other field
/// is kept as fetched.
pub fn merge_edit(mut remote: StrategyConfig, displayed: StrategyParams) -> StrategyConfig {
    displayed.apply_to(&mut remote);
    remote
}

#[derive(Debug)]
struct FieldState {
    focus: Option<EditableField>,
    values: StrategyParams,
    /// Bumped on every committed edit.
    generation: u64,
}

/// The two editable threshold fields, shared between the UI and the
/// reconciler.
#[derive(Debug, Clone)]
pub struct EditableFields {
    state: Arc<Mutex<FieldState>>,
    edits: mpsc::Sender<StrategyParams>,
}

impl EditableFields {
    /// Returns the fields plus the receiver of committed edits, which the
    /// reconciler consumes.
    pub fn new(initial: StrategyParams) -> (Self, mpsc::Receiver<StrategyParams>) {
        let (edits, edits_rx) = mpsc::channel(EDIT_QUEUE_SIZE);
        let fields = Self {
            state: Arc::new(Mutex::new(FieldState {
                focus: None,
                values: initial,
                generation: 0,
            })),
            edits,
        };
        (fields, edits_rx)
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        let state = self.state.lock();
        FieldSnapshot {
            has_focus: state.focus.is_some(),
            displayed: state.values,
        }
    }

    pub fn values(&self) -> StrategyParams {
        self.state.lock().values
    }

    pub fn focused(&self) -> Option<EditableField> {
        self.state.lock().focus
    }

    pub fn set_focus(&self, focus: Option<EditableField>) {
        self.state.lock().focus = focus;
    }

    /// Count of committed edits so far.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Commits a user edit of one field and queues a push of both values.
    pub fn commit(&self, field: EditableField, value: u32) -> AppResult<StrategyParams> {
        let params = {
            let mut state = self.state.lock();
            let mut params = state.values;
            match field {
                EditableField::UpticksToSell => params.upticks_to_sell = value,
                EditableField::DownticksToBuy => params.downticks_to_buy = value,
            }
            params.validate()?;
            state.values = params;
            state.generation += 1;
            params
        };
        if self.edits.try_send(params).is_err() {
            tracing::warn!(?field, value, "Edit queue full or closed, push not scheduled");
        }
        Ok(params)
    }

    /// Applies remote values read at edit generation `seen`. Refused when a
    /// field has focus or an edit was committed since.
    pub fn apply_remote(&self, params: StrategyParams, seen: u64) -> bool {
        let mut state = self.state.lock();
        if state.focus.is_some() || state.generation != seen {
            return false;
        }
        state.values = params;
        true
    }
}

pub struct ConfigReconciler {
    transport: Arc<dyn Transport>,
    fields: EditableFields,
    strategy_id: String,
    pull_interval: Duration,
    chart_tx: mpsc::Sender<ChartCommand>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl ConfigReconciler {
    pub fn new(
        transport: Arc<dyn Transport>,
        fields: EditableFields,
        strategy_id: &str,
        pull_interval: Duration,
        chart_tx: mpsc::Sender<ChartCommand>,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            transport,
            fields,
            strategy_id: strategy_id.to_string(),
            pull_interval,
            chart_tx,
            event_tx,
        }
    }

    pub fn spawn(self, edits: mpsc::Receiver<StrategyParams>) -> JoinHandle<()> {
        tokio::spawn(self.run(edits))
    }

    pub async fn run(self, mut edits: mpsc::Receiver<StrategyParams>) {
        let mut ticker = tokio::time::interval(self.pull_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut edits_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.pull_once().await {
                        tracing::warn!(strategy_id = %self.strategy_id, error = %e, "Config pull failed");
                        let _ = self.event_tx.try_send(AppEvent::FetchFailed {
                            source: "strategy config".to_string(),
                            error: e.to_string(),
                        });
                    }
                }
                edit = edits.recv(), if edits_open => match edit {
                    Some(params) => {
                        if let Err(e) = self.push_edit(params).await {
                            tracing::warn!(strategy_id = %self.strategy_id, error = %e, "Config push failed, chart resync skipped");
                            let _ = self.event_tx.try_send(AppEvent::ConfigPushFailed(e.to_string()));
                        }
                    }
                    None => {
                        tracing::debug!("Edit channel closed, pull only");
                        edits_open = false;
                    }
                },
            }
        }
    }

    /// One periodic pull. Skips the fetch while a field has focus.
    pub async fn pull_once(&self) -> AppResult<PullDecision> {
        if self.fields.snapshot().has_focus {
            tracing::trace!("Field focused, skipping config pull");
            return Ok(PullDecision::SkipFocused);
        }
        let seen = self.fields.generation();

        let remote: StrategySnapshot =
            fetch_as(self.transport.as_ref(), &endpoints::strategy(&self.strategy_id)).await?;

        // Focus may have been taken, or an edit committed, while the fetch was
        // in flight. The queued push carries the edit.
        if self.fields.generation() != seen {
            tracing::debug!("Edit committed during config pull, result discarded");
            return Ok(PullDecision::SkipEdited);
        }
        let decision = plan_pull(&self.fields.snapshot(), &remote.config);
        if let PullDecision::Overwrite(params) = decision {
            if !self.fields.apply_remote(params, seen) {
                return Ok(PullDecision::SkipFocused);
            }
            tracing::info!(
                upticks_to_sell = params.upticks_to_sell,
                downticks_to_buy = params.downticks_to_buy,
                "Remote strategy config changed"
            );
            let _ = self.event_tx.try_send(AppEvent::RemoteConfigApplied(params));
            self.request_resync().await;
        }
        Ok(decision)
    }

    /// Read-modify-write of the remote config. The resync is requested only
    /// after the write has been acknowledged.
    pub async fn push_edit(&self, displayed: StrategyParams) -> AppResult<StrategyConfig> {
        let remote: StrategySnapshot =
            fetch_as(self.transport.as_ref(), &endpoints::strategy(&self.strategy_id)).await?;
        let merged = merge_edit(remote.config, displayed);
        let body = serde_json::to_value(&merged)?;

        self.transport
            .fetch_and_push(&endpoints::reconfigure(&self.strategy_id), &body)
            .await?;

        tracing::info!(
            upticks_to_sell = displayed.upticks_to_sell,
            downticks_to_buy = displayed.downticks_to_buy,
            "Strategy reconfigured"
        );
        let _ = self.event_tx.try_send(AppEvent::ConfigPushed(displayed));
        self.request_resync().await;
        Ok(merged)
    }

    async fn request_resync(&self) {
        if self.chart_tx.send(ChartCommand::Resync).await.is_err() {
            tracing::warn!("Chart channel closed, resync dropped");
        }
    }
}
