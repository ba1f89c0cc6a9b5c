//! HTTP client for the external meeting-link provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meetgrid_core::errors::{MeetgridError, MeetgridResult};
use meetgrid_core::ports::MeetingProvisioner;

#[derive(Debug, Serialize)]
struct CreateMeetingRequest<'a> {
    topic: &'a str,
    start_time: DateTime<Utc>,
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    join_url: String,
}

/// Provisions meeting links by POSTing to `{base_url}/meetings`. The
/// provider is a black box: any transport failure, non-success status or
/// unexpected payload is a `Provisioning` error, safe to retry from scratch
/// because nothing has been committed when this runs.
pub struct HttpMeetingProvisioner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMeetingProvisioner {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MeetingProvisioner for HttpMeetingProvisioner {
    async fn provision(
        &self,
        topic: &str,
        start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> MeetgridResult<String> {
        let url = format!("{}/meetings", self.base_url);
        tracing::debug!(%url, topic, %start, duration_minutes, "provisioning meeting");

        let response = self
            .client
            .post(&url)
            .json(&CreateMeetingRequest {
                topic,
                start_time: start,
                duration: duration_minutes,
            })
            .send()
            .await
            .map_err(|e| MeetgridError::Provisioning(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MeetgridError::Provisioning(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let meeting: CreateMeetingResponse = response
            .json()
            .await
            .map_err(|e| MeetgridError::Provisioning(format!("unexpected payload: {e}")))?;

        Ok(meeting.join_url)
    }
}
