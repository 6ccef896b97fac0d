use crate::api::RoutineApi;
use crate::calendar::{CalendarView, YearMonth};
use crate::date_window::DateWindow;
use crate::errors::ClientError;
use crate::models::{EntryPayload, PractitionerId, RoutineId};
use crate::mutator::{EntryKey, EntryMutator, MutationOutcome};
use crate::reconciler::RoutineListReconciler;
use crate::view::{DashboardView, Feedback, FeedbackTone};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Everything one practitioner's dashboard holds, in one owned value.
pub struct Dashboard {
    api: Arc<dyn RoutineApi>,
    reconciler: RoutineListReconciler,
    mutator: EntryMutator,
    feedback: Mutex<HashMap<RoutineId, Feedback>>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn RoutineApi>, practitioner: PractitionerId, today: NaiveDate) -> Self {
        Self {
            reconciler: RoutineListReconciler::new(
                Arc::clone(&api),
                practitioner,
                DateWindow::open(today),
            ),
            mutator: EntryMutator::new(Arc::clone(&api)),
            api,
            feedback: Mutex::new(HashMap::new()),
        }
    }

    pub async fn reload(&self) -> Result<(), ClientError> {
        self.reconciler.reload().await
    }

    pub async fn go_back(&self) -> Result<bool, ClientError> {
        self.reconciler.go_back().await
    }

    pub async fn go_forward(&self) -> Result<bool, ClientError> {
        self.reconciler.go_forward().await
    }

    pub async fn roll_over(&self, today: NaiveDate) -> Result<bool, ClientError> {
        self.reconciler.roll_over(today).await
    }

    /// Completes `routine_id` for the selected date, then reloads.
    ///
    /// An entry that already existed counts as success
    /// (`MutationOutcome::AlreadyCompleted`).
    pub async fn complete(
        &self,
        routine_id: &RoutineId,
        payload: EntryPayload,
    ) -> Result<MutationOutcome, ClientError> {
        let date = self.reconciler.current_date().await;
        let Some(routine) = self.reconciler.routine(routine_id).await else {
            return Err(ClientError::validation(format!("unknown routine {routine_id}")));
        };

        let result = match self.mutator.complete(&routine, date, payload).await {
            Ok(()) => Ok(MutationOutcome::Completed),
            Err(ClientError::Conflict(_)) => Ok(MutationOutcome::AlreadyCompleted),
            Err(err) => Err(err),
        };
        self.settle(routine_id, date, result).await
    }

    pub async fn uncomplete(&self, routine_id: &RoutineId) -> Result<MutationOutcome, ClientError> {
        let date = self.reconciler.current_date().await;
        let result = self
            .mutator
            .uncomplete(routine_id, date)
            .await
            .map(|()| MutationOutcome::Uncompleted);
        self.settle(routine_id, date, result).await
    }

    /// Month calendar of one listed routine. Defaults to the month of the
    /// selected date.
    pub async fn calendar(
        &self,
        routine_id: &RoutineId,
        month: Option<YearMonth>,
    ) -> Result<CalendarView, ClientError> {
        let Some(routine) = self.reconciler.routine(routine_id).await else {
            return Err(ClientError::NotFound(format!("unknown routine {routine_id}")));
        };
        let window = self.reconciler.window().await;
        let month = month.unwrap_or_else(|| YearMonth::of(window.current()));
        let data = self.api.calendar(routine_id, month).await?;
        Ok(CalendarView::build(&routine, &data, window.today()))
    }

    pub async fn view(&self) -> DashboardView {
        let snapshot = self.reconciler.snapshot().await;
        let hints = self.mutator.hints_for(snapshot.window.current());
        let feedback = self.feedback.lock().clone();
        DashboardView::build(&snapshot, &hints, &feedback)
    }

    async fn settle(
        &self,
        routine_id: &RoutineId,
        date: NaiveDate,
        result: Result<MutationOutcome, ClientError>,
    ) -> Result<MutationOutcome, ClientError> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if !err.is_auth_expired() {
                    self.set_feedback(routine_id, date, FeedbackTone::Error, err.user_message());
                }
                return Err(err);
            }
        };
        self.set_feedback(routine_id, date, FeedbackTone::Confirmation, outcome.message().to_string());

        // Re-derive the list from the backend instead of patching it locally.
        // The control hint is visible to views rendered during this reload.
        let reloaded = self.reconciler.reload().await;
        self.mutator.clear_hint(&EntryKey::new(routine_id.clone(), date));
        match reloaded {
            Err(err) if err.is_auth_expired() => Err(err),
            Err(err) => {
                warn!(%err, "reload after mutation failed");
                Ok(outcome)
            }
            Ok(()) => Ok(outcome),
        }
    }

    fn set_feedback(&self, routine_id: &RoutineId, date: NaiveDate, tone: FeedbackTone, message: String) {
        self.feedback
            .lock()
            .insert(routine_id.clone(), Feedback { date, tone, message });
    }
}
