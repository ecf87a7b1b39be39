//! Blocking client for the travel-plan API

use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::assembler::assemble_with;
use crate::config::{ClientConfig, ExtractionConfig};
use crate::error::ClientError;
use crate::model::{DisplayItinerary, PlanCreated, RawPlan, StatusSnapshot, TravelPreferences};

/// Prefix of ids handed out before the backend has accepted a plan
pub const PLACEHOLDER_PREFIX: &str = "temp-";

pub fn is_placeholder_id(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// How polling for a plan ended
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The status endpoint reported completion
    Completed(StatusSnapshot),
    /// `max_polls` ran out first; the plan may still be fetched
    GaveUp {
        polls: u32,
        last: Option<StatusSnapshot>,
    },
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }
}

pub struct TravelClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl TravelClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
                .http_status_as_error(false)
                .build(),
        );
        Self { agent, config }
    }

    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.config.bearer_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn read_json<T: DeserializeOwned>(
        url: &str,
        response: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<T, ClientError> {
        let response = response.map_err(|e| ClientError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ClientError::Decode {
                url: url.to_string(),
                detail: e.to_string(),
            })?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    /// `POST /agents/travel-plan`; returns the new plan id
    pub fn submit_preferences(&self, preferences: &TravelPreferences) -> Result<String, ClientError> {
        let url = self.endpoint("agents/travel-plan");
        let response = self.authorize(self.agent.post(&url)).send_json(preferences);
        let created: PlanCreated = Self::read_json(&url, response)?;
        debug!(id = %created.id, "travel plan submitted");
        Ok(created.id)
    }

    /// `GET /agents/travel-plan/{id}`
    pub fn get_travel_plan(&self, id: &str) -> Result<RawPlan, ClientError> {
        if is_placeholder_id(id) {
            return Err(ClientError::PlaceholderId(id.to_string()));
        }
        let url = self.endpoint(&format!("agents/travel-plan/{}", id));
        let response = self.authorize(self.agent.get(&url)).call();
        Self::read_json(&url, response)
    }

    /// `GET /agents/travel-plan/{id}/status`
    pub fn get_itinerary_status(&self, id: &str) -> Result<StatusSnapshot, ClientError> {
        if is_placeholder_id(id) {
            return Err(ClientError::PlaceholderId(id.to_string()));
        }
        let url = self.endpoint(&format!("agents/travel-plan/{}/status", id));
        let response = self.authorize(self.agent.get(&url)).call();
        Self::read_json(&url, response)
    }

    /// Poll the status endpoint until the plan completes or `max_polls` runs out
    pub fn wait_for_plan(&self, id: &str) -> Result<PollOutcome, ClientError> {
        self.wait_for_plan_with(id, |_| {})
    }

    /// [`wait_for_plan`](Self::wait_for_plan), handing every snapshot to `observer`.
    ///
    /// Failed polls are logged and retried; only a placeholder id fails outright.
    pub fn wait_for_plan_with(
        &self,
        id: &str,
        mut observer: impl FnMut(&StatusSnapshot),
    ) -> Result<PollOutcome, ClientError> {
        if is_placeholder_id(id) {
            return Err(ClientError::PlaceholderId(id.to_string()));
        }

        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut last = None;

        for poll in 1..=self.config.max_polls {
            match self.get_itinerary_status(id) {
                Ok(snapshot) => {
                    for (agent, error) in snapshot.failed_agents() {
                        warn!(id, agent, error, "agent reported an error");
                    }
                    observer(&snapshot);
                    if snapshot.is_complete() {
                        debug!(id, poll, "travel plan completed");
                        return Ok(PollOutcome::Completed(snapshot));
                    }
                    last = Some(snapshot);
                }
                Err(err) => warn!(id, poll, error = %err, "status poll failed, retrying"),
            }
            if poll < self.config.max_polls {
                thread::sleep(interval);
            }
        }

        warn!(id, polls = self.config.max_polls, "gave up waiting for travel plan");
        Ok(PollOutcome::GaveUp {
            polls: self.config.max_polls,
            last,
        })
    }

    /// Fetch a plan and assemble it for display
    pub fn fetch_itinerary(
        &self,
        id: &str,
        extraction: &ExtractionConfig,
    ) -> Result<DisplayItinerary, ClientError> {
        let raw = self.get_travel_plan(id)?;
        Ok(assemble_with(&raw, extraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TravelClient {
        TravelClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9/api/".to_string(),
            timeout_secs: 1,
            poll_interval_ms: 0,
            max_polls: 2,
            bearer_token: Some("secret".to_string()),
        })
    }

    #[test]
    fn placeholder_ids_are_refused_without_a_request() {
        let client = client();
        assert!(matches!(
            client.get_travel_plan("temp-123"),
            Err(ClientError::PlaceholderId(id)) if id == "temp-123"
        ));
        assert!(matches!(
            client.wait_for_plan("temp-123"),
            Err(ClientError::PlaceholderId(_))
        ));
        assert!(is_placeholder_id("temp-"));
        assert!(!is_placeholder_id("plan-temp-1"));
    }

    #[test]
    fn endpoints_join_cleanly() {
        assert_eq!(
            client().endpoint("agents/travel-plan"),
            "http://127.0.0.1:9/api/agents/travel-plan"
        );
    }

    #[test]
    fn unreachable_backend_gives_up_after_max_polls() {
        let mut seen = 0;
        let outcome = client().wait_for_plan_with("abc", |_| seen += 1).unwrap();

        assert!(!outcome.is_completed());
        assert!(matches!(outcome, PollOutcome::GaveUp { polls: 2, last: None }));
        assert_eq!(seen, 0);
    }

    #[test]
    fn transport_failures_are_reported() {
        let err = client().get_travel_plan("abc").unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
