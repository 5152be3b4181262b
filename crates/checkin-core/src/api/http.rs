//! reqwest-backed roster API client

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{ApiError, ApiResult, RosterApi};
use crate::config::ScannerConfig;
use crate::models::{timestamp, Attendee, EventId, RosterSnapshot};
use crate::util::error_excerpt;

const API_KEY_HEADER: &str = "api-key";

#[derive(Clone)]
pub struct HttpRosterApi {
    roster_endpoint: String,
    checkin_endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpRosterApi {
    pub fn new(config: &ScannerConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            roster_endpoint: config.roster_endpoint.clone(),
            checkin_endpoint: config.checkin_endpoint.clone(),
            api_key: config.api_key.clone(),
            client: builder.build()?,
        })
    }

    fn roster_url(&self, event_id: &EventId) -> String {
        format!(
            "{}/{}",
            self.roster_endpoint,
            urlencoding::encode(event_id.as_str())
        )
    }
}

impl RosterApi for HttpRosterApi {
    async fn fetch_roster(
        &self,
        event_id: &EventId,
        since: Option<DateTime<Utc>>,
    ) -> ApiResult<RosterSnapshot> {
        let mut request = self
            .client
            .get(self.roster_url(event_id))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(since) = since {
            request = request.query(&[("timestamp", timestamp::format(&since))]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::EventNotFound(event_id.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }

        let body = response.text().await?;
        let snapshot = serde_json::from_str::<RosterSnapshot>(&body)
            .map_err(|error| ApiError::InvalidPayload(error.to_string()))?;
        tracing::debug!(
            "Fetched {} attendee records for event {}",
            snapshot.attendees.as_ref().map_or(0, Vec::len),
            event_id
        );
        Ok(snapshot)
    }

    async fn upload_check_ins(&self, batch: &[Attendee]) -> ApiResult<()> {
        let response = self
            .client
            .post(&self.checkin_endpoint)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(batch)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
