use crate::api::RoutineApi;
use crate::errors::ClientError;
use crate::models::{EntryMutationRequest, EntryPayload, RoutineId, RoutineSummary, TrackingType};
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub routine_id: RoutineId,
    pub date: NaiveDate,
}

impl EntryKey {
    pub fn new(routine_id: RoutineId, date: NaiveDate) -> Self {
        Self { routine_id, date }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    Idle,
    Submitting,
    Settled,
    Failed,
}

/// What the clicked control shows until the reload that follows the
/// mutation finishes. Callers that render only after that reload see the
/// reloaded completion state instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlHint {
    MarkedDone,
    AlreadyDone,
    Unmarked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Completed,
    AlreadyCompleted,
    Uncompleted,
}

impl MutationOutcome {
    pub fn message(self) -> &'static str {
        match self {
            MutationOutcome::Completed => "Marked! Well done!",
            MutationOutcome::AlreadyCompleted => crate::errors::ALREADY_COMPLETED_MESSAGE,
            MutationOutcome::Uncompleted => "Completion removed.",
        }
    }
}

/// Creates and deletes completion entries.
///
/// At most one request per routine and date is in flight; a second one is
/// refused before it reaches the backend.
pub struct EntryMutator {
    api: Arc<dyn RoutineApi>,
    phases: Mutex<HashMap<EntryKey, MutationPhase>>,
    hints: Mutex<HashMap<EntryKey, ControlHint>>,
}

impl EntryMutator {
    pub fn new(api: Arc<dyn RoutineApi>) -> Self {
        Self {
            api,
            phases: Mutex::new(HashMap::new()),
            hints: Mutex::new(HashMap::new()),
        }
    }

    /// Records a completion. A `Conflict` means the entry already existed.
    pub async fn complete(
        &self,
        routine: &RoutineSummary,
        date: NaiveDate,
        payload: EntryPayload,
    ) -> Result<(), ClientError> {
        let request = build_request(routine, date, payload)?;
        let attempt = self.begin(EntryKey::new(routine.id.clone(), date))?;

        match self.api.create_entry(&request).await {
            Ok(()) => {
                info!(routine = %routine.id, %date, "entry created");
                attempt.settle(ControlHint::MarkedDone);
                Ok(())
            }
            Err(err @ ClientError::Conflict(_)) => {
                info!(routine = %routine.id, %date, "entry already existed");
                attempt.settle(ControlHint::AlreadyDone);
                Err(err)
            }
            Err(err) => {
                warn!(routine = %routine.id, %date, %err, "failed to create entry");
                attempt.fail();
                Err(err)
            }
        }
    }

    pub async fn uncomplete(&self, routine_id: &RoutineId, date: NaiveDate) -> Result<(), ClientError> {
        let attempt = self.begin(EntryKey::new(routine_id.clone(), date))?;

        match self.api.delete_entry(routine_id, date).await {
            Ok(()) => {
                info!(routine = %routine_id, %date, "entry deleted");
                attempt.settle(ControlHint::Unmarked);
                Ok(())
            }
            Err(err) => {
                warn!(routine = %routine_id, %date, %err, "failed to delete entry");
                attempt.fail();
                Err(err)
            }
        }
    }

    /// Only in-flight attempts and the last finished one are remembered;
    /// any other key reads as `Idle`.
    pub fn phase(&self, key: &EntryKey) -> MutationPhase {
        self.phases.lock().get(key).copied().unwrap_or(MutationPhase::Idle)
    }

    pub fn hint(&self, key: &EntryKey) -> Option<ControlHint> {
        self.hints.lock().get(key).copied()
    }

    pub fn hints_for(&self, date: NaiveDate) -> HashMap<RoutineId, ControlHint> {
        self.hints
            .lock()
            .iter()
            .filter(|(key, _)| key.date == date)
            .map(|(key, hint)| (key.routine_id.clone(), *hint))
            .collect()
    }

    pub fn clear_hint(&self, key: &EntryKey) {
        self.hints.lock().remove(key);
    }

    fn begin(&self, key: EntryKey) -> Result<Attempt<'_>, ClientError> {
        let mut phases = self.phases.lock();
        if phases.get(&key) == Some(&MutationPhase::Submitting) {
            return Err(ClientError::validation("already submitting"));
        }
        phases.insert(key.clone(), MutationPhase::Submitting);
        Ok(Attempt {
            mutator: self,
            key,
            finished: false,
        })
    }
}

/// One in-flight mutation. Dropping it unfinished (a cancelled future)
/// marks it failed so the key is not stuck in `Submitting`.
struct Attempt<'a> {
    mutator: &'a EntryMutator,
    key: EntryKey,
    finished: bool,
}

impl Attempt<'_> {
    fn settle(mut self, hint: ControlHint) {
        self.mutator.hints.lock().insert(self.key.clone(), hint);
        self.finish(MutationPhase::Settled);
    }

    fn fail(mut self) {
        self.finish(MutationPhase::Failed);
    }

    fn finish(&mut self, phase: MutationPhase) {
        self.finished = true;
        let mut phases = self.mutator.phases.lock();
        phases.retain(|key, current| *current == MutationPhase::Submitting || *key == self.key);
        phases.insert(self.key.clone(), phase);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(MutationPhase::Failed);
        }
    }
}

fn build_request(
    routine: &RoutineSummary,
    date: NaiveDate,
    payload: EntryPayload,
) -> Result<EntryMutationRequest, ClientError> {
    let value = match (routine.tracking_type, payload.value) {
        (TrackingType::Numeric, Some(value)) => Some(value),
        (TrackingType::Numeric, None) => {
            return Err(ClientError::validation(format!(
                "{} needs a value",
                routine.habit_name
            )));
        }
        (TrackingType::Boolean, None) => None,
        (TrackingType::Boolean, Some(_)) => {
            return Err(ClientError::validation(format!(
                "{} does not take a value",
                routine.habit_name
            )));
        }
    };
    let notes = payload
        .notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());

    Ok(EntryMutationRequest {
        routine_id: routine.id.clone(),
        date,
        value,
        notes,
    })
}
