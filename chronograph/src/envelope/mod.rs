//! Agent Envelope protocol: the standard input/output wrapper every agent uses to
//! carry confidence, issues, routing suggestions, and upstream context (spec §3, §4.1).

pub mod confidence;
pub mod issue;
pub mod metadata;
pub mod response;
pub mod routing;

pub use confidence::{ConfidenceBreakdown, ConfidenceWeights};
pub use issue::{AgentIssue, IssueCategory, Severity};
pub use metadata::{AgentMetadata, UpstreamContext};
pub use response::{
    has_critical, has_retryable, is_success, needs_escalation, needs_retry, AgentResponse,
    CorrectionsSummary,
};
pub use routing::{AgentRouting, RetryRecommendation, RoutingAction, RoutingSuggestion};
