use crate::api::RoutineApi;
use crate::completion::CompletionIndex;
use crate::date_window::DateWindow;
use crate::errors::ClientError;
use crate::models::{PractitionerId, RoutineId, RoutineSummary, StatisticsSummary};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Ready,
    /// Routines or statistics could not be refreshed; the last good list stays.
    ReloadFailed { message: String },
    /// Completion lookup failed; every routine shows as not completed.
    CompletionsUnknown { message: String },
}

/// Immutable copy of everything the routine list renders from.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub window: DateWindow,
    pub routines: Vec<RoutineSummary>,
    pub statistics: Option<StatisticsSummary>,
    /// Completed routines for `window.current()`. Empty while the index
    /// covers some other date.
    pub completed: BTreeSet<RoutineId>,
    pub loaded: bool,
    pub status: ListStatus,
}

impl ListSnapshot {
    pub fn is_completed(&self, routine_id: &RoutineId) -> bool {
        self.completed.contains(routine_id)
    }
}

struct ListState {
    window: DateWindow,
    routines: Vec<RoutineSummary>,
    routine_ids: BTreeSet<RoutineId>,
    statistics: Option<StatisticsSummary>,
    index: CompletionIndex,
    loaded: bool,
    status: ListStatus,
    /// Set by a failed reload, cleared only by a successful one.
    catalog_error: Option<String>,
    catalog_rendered: u64,
    index_rendered: u64,
}

/// Owns the routine list, the statistics, the date window and the completion
/// index, and decides what the list shows.
///
/// Network calls run without holding the state lock. Every fetch takes a
/// ticket from a monotonic counter and its result is applied only if no
/// higher ticket has been applied already and the inputs it was issued for
/// are still current, so a slow response can never paint over a newer one.
pub struct RoutineListReconciler {
    api: Arc<dyn RoutineApi>,
    practitioner: PractitionerId,
    catalog_seq: AtomicU64,
    index_seq: AtomicU64,
    state: Mutex<ListState>,
}

impl RoutineListReconciler {
    pub fn new(api: Arc<dyn RoutineApi>, practitioner: PractitionerId, window: DateWindow) -> Self {
        Self {
            api,
            practitioner,
            catalog_seq: AtomicU64::new(0),
            index_seq: AtomicU64::new(0),
            state: Mutex::new(ListState {
                window,
                routines: Vec::new(),
                routine_ids: BTreeSet::new(),
                statistics: None,
                index: CompletionIndex::default(),
                loaded: false,
                status: ListStatus::Loading,
                catalog_error: None,
                catalog_rendered: 0,
                index_rendered: 0,
            }),
        }
    }

    /// Fetches routines and statistics together, replaces both, then
    /// refreshes completions for the selected date.
    ///
    /// A failure of either fetch leaves the previous list in place.
    pub async fn reload(&self) -> Result<(), ClientError> {
        let ticket = self.catalog_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = tokio::try_join!(
            self.api.active_routines(&self.practitioner),
            self.api.statistics(&self.practitioner),
        );

        let (routines, statistics) = match fetched {
            Ok(pair) => pair,
            Err(err) => {
                error!(ticket, %err, "failed to reload routine list");
                let mut state = self.state.lock().await;
                if ticket > state.catalog_rendered && !err.is_auth_expired() {
                    let message = err.user_message();
                    state.catalog_error = Some(message.clone());
                    state.status = ListStatus::ReloadFailed { message };
                }
                return Err(err);
            }
        };

        {
            let mut state = self.state.lock().await;
            if ticket <= state.catalog_rendered {
                debug!(ticket, rendered = state.catalog_rendered, "dropping superseded routine list");
                return Ok(());
            }
            info!(ticket, routines = routines.len(), "routine list reloaded");
            state.catalog_rendered = ticket;
            state.routine_ids = routines.iter().map(|routine| routine.id.clone()).collect();
            state.routines = routines;
            state.statistics = Some(statistics);
            state.loaded = true;
            state.catalog_error = None;
        }

        self.refresh_completions(true).await
    }

    /// Re-runs only the completion lookup; routines and statistics do not
    /// depend on the date.
    pub async fn on_date_changed(&self) -> Result<(), ClientError> {
        self.refresh_completions(false).await
    }

    pub async fn go_back(&self) -> Result<bool, ClientError> {
        self.navigate(DateWindow::go_back).await
    }

    pub async fn go_forward(&self) -> Result<bool, ClientError> {
        self.navigate(DateWindow::go_forward).await
    }

    /// Re-opens the window when the local calendar day is no longer the one
    /// it was opened on. Returns whether it did.
    pub async fn roll_over(&self, today: NaiveDate) -> Result<bool, ClientError> {
        {
            let mut state = self.state.lock().await;
            if state.window.today() == today {
                return Ok(false);
            }
            info!(from = %state.window.today(), to = %today, "calendar day changed");
            state.window = DateWindow::open(today);
        }
        self.on_date_changed().await?;
        Ok(true)
    }

    pub async fn current_date(&self) -> NaiveDate {
        self.state.lock().await.window.current()
    }

    pub async fn window(&self) -> DateWindow {
        self.state.lock().await.window
    }

    pub async fn routine(&self, routine_id: &RoutineId) -> Option<RoutineSummary> {
        let state = self.state.lock().await;
        state
            .routines
            .iter()
            .find(|routine| &routine.id == routine_id)
            .cloned()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock().await;
        let completed = if state.index.date() == Some(state.window.current()) {
            state.index.completed().clone()
        } else {
            BTreeSet::new()
        };
        ListSnapshot {
            window: state.window,
            routines: state.routines.clone(),
            statistics: state.statistics.clone(),
            completed,
            loaded: state.loaded,
            status: state.status.clone(),
        }
    }

    async fn navigate(&self, step: fn(&mut DateWindow) -> bool) -> Result<bool, ClientError> {
        let moved = step(&mut self.state.lock().await.window);
        if moved {
            self.on_date_changed().await?;
        }
        Ok(moved)
    }

    async fn refresh_completions(&self, force: bool) -> Result<(), ClientError> {
        let (ticket, routine_ids, date) = {
            let state = self.state.lock().await;
            let date = state.window.current();
            if !force && state.index.is_fresh_for(&state.routine_ids, date) {
                return Ok(());
            }
            let ticket = self.index_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, state.routine_ids.clone(), date)
        };

        let mut index = CompletionIndex::default();
        let result = index
            .refresh(self.api.as_ref(), &routine_ids, date)
            .await
            .map(|_| ());

        let mut state = self.state.lock().await;
        let superseded = ticket <= state.index_rendered
            || date != state.window.current()
            || routine_ids != state.routine_ids;
        if superseded {
            debug!(ticket, %date, "dropping superseded completion lookup");
            return match result {
                Err(err) if err.is_auth_expired() => Err(err),
                _ => Ok(()),
            };
        }

        state.index_rendered = ticket;
        state.index = index;
        match result {
            Ok(()) => {
                if let Some(message) = state.catalog_error.clone() {
                    state.status = ListStatus::ReloadFailed { message };
                } else if state.loaded {
                    state.status = ListStatus::Ready;
                }
                Ok(())
            }
            Err(err) => {
                if !err.is_auth_expired() {
                    warn!(%date, %err, "completion lookup failed; showing routines as not completed");
                    state.status = ListStatus::CompletionsUnknown {
                        message: err.user_message(),
                    };
                }
                Err(err)
            }
        }
    }
}
