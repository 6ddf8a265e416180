use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::AppResult;

pub type PollHandle = JoinHandle<()>;

/// One fetch-and-render step run by a [`DataPoller`].
#[async_trait]
pub trait PollAction: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn run(&self) -> AppResult<()>;
}

/// Fixed-interval scheduler for [`PollAction`]s.
///
/// Every invocation runs in its own task. A slow response never delays the
/// next tick, so two fetches can overlap and the sink keeps whichever
/// response arrives last.
pub struct DataPoller;

impl DataPoller {
    /// Runs `action` now and then every `interval` for the rest of the session.
    pub fn schedule<A: PollAction>(interval: Duration, action: Arc<A>) -> PollHandle {
        tokio::spawn(poll_loop::<A, ()>(interval, action, None))
    }

    /// Like [`DataPoller::schedule`], and also runs `action` right away each
    /// time `trigger` changes. The periodic schedule is not reset.
    pub fn schedule_with_trigger<A, T>(
        interval: Duration,
        action: Arc<A>,
        trigger: watch::Receiver<T>,
    ) -> PollHandle
    where
        A: PollAction,
        T: Send + Sync + 'static,
    {
        tokio::spawn(poll_loop(interval, action, Some(trigger)))
    }
}

async fn poll_loop<A, T>(interval: Duration, action: Arc<A>, mut trigger: Option<watch::Receiver<T>>)
where
    A: PollAction,
    T: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(poller = action.name(), interval_ms = interval.as_millis() as u64, "Poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = trigger_changed(&mut trigger) => {
                if changed.is_err() {
                    tracing::debug!(poller = action.name(), "Trigger dropped, interval only");
                    trigger = None;
                    continue;
                }
                tracing::debug!(poller = action.name(), "Triggered refresh");
            }
        }
        run_detached(action.clone());
    }
}

async fn trigger_changed<T>(
    trigger: &mut Option<watch::Receiver<T>>,
) -> Result<(), watch::error::RecvError> {
    match trigger {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}

fn run_detached<A: PollAction>(action: Arc<A>) {
    tokio::spawn(async move {
        if let Err(e) = action.run().await {
            tracing::warn!(poller = action.name(), error = %e, "Poll failed, keeping previous rows");
        }
    });
}
