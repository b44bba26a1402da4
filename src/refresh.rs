//! Periodic and manual refresh of the displayed map state.
//!
//! Every refresh is a full reload that replaces the displayed state when it
//! succeeds. A failed refresh never clears what is displayed; it only
//! leaves an advisory. Refreshes run one after another on a single task,
//! so the most recently resolved load is always the one shown.

use crate::error::MapError;
use crate::loader::{MapLoader, MapState, SourceFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared, replace-only view of the latest good state
pub type SharedState = Arc<RwLock<Option<MapState>>>;

/// Requests an immediate refresh from another task
#[derive(Debug, Clone, Default)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    /// Ask for a refresh; triggers made while one is pending coalesce
    pub fn trigger(&self) {
        self.notify.notify_one();
    }
}

/// Result of one refresh attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Displayed state was replaced
    Updated,
    /// Load failed; the previous state (if any) is still displayed
    Kept { advisory: String },
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated)
    }
}

pub struct Refresher<F> {
    loader: MapLoader<F>,
    state: SharedState,
    interval: Duration,
    handle: RefreshHandle,
    last_advisory: Option<String>,
}

impl<F: SourceFetcher> Refresher<F> {
    pub fn new(loader: MapLoader<F>, interval: Duration) -> Self {
        Self {
            loader,
            state: Arc::new(RwLock::new(None)),
            interval,
            handle: RefreshHandle::default(),
            last_advisory: None,
        }
    }

    pub fn handle(&self) -> RefreshHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    pub fn loader(&self) -> &MapLoader<F> {
        &self.loader
    }

    /// Most recent user-facing notice, cleared by a clean load
    pub fn last_advisory(&self) -> Option<&str> {
        self.last_advisory.as_deref()
    }

    pub async fn refresh_once(&mut self) -> RefreshOutcome {
        match self.loader.load().await {
            Ok(state) => {
                self.last_advisory = state.advisories.first().cloned();
                *self.state.write().await = Some(state);
                RefreshOutcome::Updated
            }
            Err(e) => {
                let advisory = feed_advisory(&e, self.state.read().await.is_some());
                warn!("{}", advisory);
                self.last_advisory = Some(advisory.clone());
                RefreshOutcome::Kept { advisory }
            }
        }
    }

    /// Refresh on the interval and on manual triggers until cancelled.
    ///
    /// The first refresh runs immediately. `on_update` sees every outcome
    /// together with whatever state is displayed afterwards. A refresh
    /// already in progress when cancellation arrives runs to completion.
    pub async fn run<C>(&mut self, cancel: CancellationToken, mut on_update: C)
    where
        C: FnMut(&RefreshOutcome, Option<&MapState>),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let notify = Arc::clone(&self.handle.notify);

        info!("Refreshing every {}s", self.interval.as_secs());
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Refresh loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("Periodic refresh");
                }
                _ = notify.notified() => {
                    debug!("Manual refresh");
                }
            }

            let outcome = self.refresh_once().await;
            let state = self.state.read().await;
            on_update(&outcome, state.as_ref());
        }
    }
}

fn feed_advisory(error: &MapError, has_state: bool) -> String {
    if has_state {
        format!("Feed refresh failed ({}); showing previously loaded data", error)
    } else {
        format!("Feed load failed ({}); nothing to display yet", error)
    }
}
