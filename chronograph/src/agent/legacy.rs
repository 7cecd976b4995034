//! `LegacyAdapter`: wraps an arbitrary `input -> output` function into the same
//! envelope shape the base template produces, without requiring the callable to
//! implement [`super::Agent`] (spec §9: "a legacy-adapter variant exists to wrap any
//! callable into the same shape; use it instead of inheritance").

use super::{AgentContext, ExecutableAgent};
use crate::agent::error::AgentError;
use crate::envelope::confidence::ConfidenceBreakdown;
use crate::envelope::issue::AgentIssue;
use crate::envelope::routing::{AgentRouting, RetryRecommendation};
use crate::envelope::{AgentMetadata, AgentResponse};
use crate::agent::base::MAX_AUTO_RETRY_ATTEMPTS;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::BoxFuture;
use serde_json::Value;
use std::time::Instant;

type LegacyFn = Box<dyn Fn(Value) -> BoxFuture<'static, Result<Value, AgentError>> + Send + Sync>;

/// Wraps a plain function into an [`ExecutableAgent`]. On success the envelope carries
/// default confidence 0.8 (no breakdown computation); on failure it emits the same
/// standard error envelope the base template would.
pub struct LegacyAdapter {
    agent_id: String,
    func: LegacyFn,
}

impl LegacyAdapter {
    pub fn new(
        agent_id: impl Into<String>,
        func: impl Fn(Value) -> BoxFuture<'static, Result<Value, AgentError>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl ExecutableAgent for LegacyAdapter {
    async fn execute(&self, input: Value, context: &AgentContext, step_name: &str) -> AgentResponse {
        let started = Instant::now();
        match (self.func)(input).await {
            Ok(data) => {
                let breakdown = ConfidenceBreakdown::new(0.8, 0.8, 0.8, 0.8);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                AgentResponse {
                    data: Some(data),
                    metadata: AgentMetadata::from_breakdown(breakdown, elapsed_ms),
                    routing: AgentRouting::default(),
                    corrections: None,
                    timestamp: Utc::now(),
                    agent_id: self.agent_id.clone(),
                    step_name: step_name.to_string(),
                }
            }
            Err(err) => {
                let issue = AgentIssue::execution_error(err.to_string());
                let mut routing = AgentRouting::default();
                if context.retry_attempt < MAX_AUTO_RETRY_ATTEMPTS {
                    routing.retry_recommendation = Some(RetryRecommendation {
                        should_retry: true,
                        reason: issue.message.clone(),
                        suggested_changes: "retry the step".to_string(),
                        parameter_overrides: serde_json::Map::new(),
                        max_retries: MAX_AUTO_RETRY_ATTEMPTS,
                    });
                }
                let breakdown = ConfidenceBreakdown::new(0.0, 0.0, 0.0, 0.0);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let mut metadata = AgentMetadata::from_breakdown(breakdown, elapsed_ms);
                metadata.issues.push(issue);
                AgentResponse {
                    data: None,
                    metadata,
                    routing,
                    corrections: None,
                    timestamp: Utc::now(),
                    agent_id: self.agent_id.clone(),
                    step_name: step_name.to_string(),
                }
            }
        }
    }
}
