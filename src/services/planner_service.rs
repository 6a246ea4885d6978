use std::sync::Arc;
use thiserror::Error;

use super::gemini_service::{GeminiClient, HttpTransport, RetryPolicy, TokioDelay};
use super::plan_text::{extract_plan_text, fallback_plan, mock_plan, GENERIC_REASON, MOCK_REASON};
use super::prompt_builder::build_prompt;
use crate::config::GeminiSettings;
use crate::models::trip::TripParams;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("GEMINI_ENDPOINT not configured")]
    EndpointNotConfigured,
}

/// Plan text plus the reason it is degraded, if it is.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: String,
    pub fallback_reason: Option<String>,
}

enum Backend {
    Mock,
    Live {
        endpoint: Option<String>,
        client: GeminiClient,
    },
}

/// Turns trip parameters into a plan. AI outages produce a degraded plan, not
/// an error.
pub struct TripPlanner {
    backend: Backend,
}

impl TripPlanner {
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        match settings.live_api_key() {
            Some(key) => Self::live(
                settings.endpoint.clone(),
                GeminiClient::new(
                    Arc::new(HttpTransport::new(key)),
                    Arc::new(TokioDelay),
                    RetryPolicy::from(settings),
                ),
            ),
            None => Self::mock(),
        }
    }

    pub fn mock() -> Self {
        Self {
            backend: Backend::Mock,
        }
    }

    pub fn live(endpoint: Option<String>, client: GeminiClient) -> Self {
        Self {
            backend: Backend::Live { endpoint, client },
        }
    }

    pub async fn plan(&self, params: &TripParams) -> Result<PlanOutcome, PlannerError> {
        let (endpoint, client) = match &self.backend {
            Backend::Mock => {
                log::info!("No Gemini key configured, using mock plan for {}", params.destination);
                return Ok(PlanOutcome {
                    plan: mock_plan(params),
                    fallback_reason: Some(MOCK_REASON.to_string()),
                });
            }
            Backend::Live { endpoint, client } => (
                endpoint
                    .as_deref()
                    .ok_or(PlannerError::EndpointNotConfigured)?,
                client,
            ),
        };

        let prompt = build_prompt(params);
        let reason = match client.generate(endpoint, &prompt).await {
            Ok(response) => match extract_plan_text(&response) {
                Some(plan) => {
                    return Ok(PlanOutcome {
                        plan,
                        fallback_reason: None,
                    })
                }
                None => {
                    log::error!("Gemini final error: no text in response: {}", response);
                    GENERIC_REASON.to_string()
                }
            },
            Err(err) => {
                log::error!(
                    "Gemini final error: status={:?}, message={}",
                    err.status(),
                    err
                );
                err.status()
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| GENERIC_REASON.to_string())
            }
        };

        Ok(PlanOutcome {
            plan: fallback_plan(params),
            fallback_reason: Some(reason),
        })
    }
}
