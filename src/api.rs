use crate::calendar::YearMonth;
use crate::errors::ClientError;
use crate::models::{
    CalendarData, EntryMutationRequest, PractitionerId, RoutineId, RoutineSummary,
    StatisticsSummary,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

/// The Plan 91 REST backend as seen by the dashboard.
///
/// Every call carries the ambient session; a rejected session comes back as
/// `ClientError::AuthExpired`.
#[async_trait]
pub trait RoutineApi: Send + Sync {
    async fn active_routines(
        &self,
        practitioner: &PractitionerId,
    ) -> Result<Vec<RoutineSummary>, ClientError>;

    async fn statistics(&self, practitioner: &PractitionerId)
        -> Result<StatisticsSummary, ClientError>;

    /// Which of `routine_ids` have an entry on `date`.
    async fn completed_routines(
        &self,
        routine_ids: &BTreeSet<RoutineId>,
        date: NaiveDate,
    ) -> Result<BTreeSet<RoutineId>, ClientError>;

    /// Success carries no body the dashboard relies on; the following
    /// reload reads the entry back.
    async fn create_entry(&self, request: &EntryMutationRequest) -> Result<(), ClientError>;

    async fn delete_entry(&self, routine_id: &RoutineId, date: NaiveDate) -> Result<(), ClientError>;

    /// Entries and scheduled days of one routine in `month`.
    async fn calendar(
        &self,
        routine_id: &RoutineId,
        month: YearMonth,
    ) -> Result<CalendarData, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `RoutineApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.with_session(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));
        debug!(status = status.as_u16(), ?message, "backend rejected request");
        Err(ClientError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RoutineApi for HttpApi {
    async fn active_routines(
        &self,
        practitioner: &PractitionerId,
    ) -> Result<Vec<RoutineSummary>, ClientError> {
        let request = self
            .client
            .get(self.url("routines/active"))
            .query(&[("practitionerId", practitioner.as_str())]);
        self.send_json(request).await
    }

    async fn statistics(
        &self,
        practitioner: &PractitionerId,
    ) -> Result<StatisticsSummary, ClientError> {
        let path = format!("analytics/practitioners/{}/statistics", practitioner.as_str());
        self.send_json(self.client.get(self.url(&path))).await
    }

    async fn completed_routines(
        &self,
        routine_ids: &BTreeSet<RoutineId>,
        date: NaiveDate,
    ) -> Result<BTreeSet<RoutineId>, ClientError> {
        let date = date.to_string();
        let mut query: Vec<(&str, &str)> = routine_ids
            .iter()
            .map(|id| ("routineIds", id.as_str()))
            .collect();
        query.push(("date", date.as_str()));

        let request = self
            .client
            .get(self.url("entries/completed-routines"))
            .query(&query);
        self.send_json(request).await
    }

    async fn create_entry(&self, request: &EntryMutationRequest) -> Result<(), ClientError> {
        let request = self.client.post(self.url("entries")).json(request);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_entry(&self, routine_id: &RoutineId, date: NaiveDate) -> Result<(), ClientError> {
        let date = date.to_string();
        let request = self
            .client
            .delete(self.url("entries"))
            .query(&[("routineId", routine_id.as_str()), ("date", date.as_str())]);
        self.send(request).await?;
        Ok(())
    }

    async fn calendar(
        &self,
        routine_id: &RoutineId,
        month: YearMonth,
    ) -> Result<CalendarData, ClientError> {
        let month = month.to_string();
        let request = self
            .client
            .get(self.url(&format!("routines/{}/calendar", routine_id.as_str())))
            .query(&[("yearMonth", month.as_str())]);
        self.send_json(request).await
    }
}
