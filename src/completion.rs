use crate::api::RoutineApi;
use crate::errors::ClientError;
use crate::models::RoutineId;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// The `(date, routine set)` pair a completion result was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub date: NaiveDate,
    pub routine_ids: BTreeSet<RoutineId>,
}

/// Routines the backend reports as completed on one date.
///
/// Only ever filled by `refresh`; after a failed refresh every lookup answers
/// `false` until the next successful one.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    key: Option<IndexKey>,
    completed: BTreeSet<RoutineId>,
}

impl CompletionIndex {
    /// Issues exactly one backend query (none for an empty routine set) and
    /// replaces the previous result wholesale.
    pub async fn refresh(
        &mut self,
        api: &dyn RoutineApi,
        routine_ids: &BTreeSet<RoutineId>,
        date: NaiveDate,
    ) -> Result<&BTreeSet<RoutineId>, ClientError> {
        let fetched = if routine_ids.is_empty() {
            Ok(BTreeSet::new())
        } else {
            api.completed_routines(routine_ids, date).await
        };

        match fetched {
            Ok(completed) => {
                // the backend only knows what we asked about
                self.completed = completed
                    .into_iter()
                    .filter(|id| routine_ids.contains(id))
                    .collect();
                self.key = Some(IndexKey {
                    date,
                    routine_ids: routine_ids.clone(),
                });
                Ok(&self.completed)
            }
            Err(err) => {
                self.invalidate();
                Err(err)
            }
        }
    }

    pub fn is_completed(&self, routine_id: &RoutineId) -> bool {
        self.key.is_some() && self.completed.contains(routine_id)
    }

    /// True when the last successful refresh was for exactly these inputs.
    pub fn is_fresh_for(&self, routine_ids: &BTreeSet<RoutineId>, date: NaiveDate) -> bool {
        self.key
            .as_ref()
            .is_some_and(|key| key.date == date && &key.routine_ids == routine_ids)
    }

    pub fn key(&self) -> Option<&IndexKey> {
        self.key.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.key.as_ref().map(|key| key.date)
    }

    pub fn completed(&self) -> &BTreeSet<RoutineId> {
        &self.completed
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.completed.clear();
    }
}
