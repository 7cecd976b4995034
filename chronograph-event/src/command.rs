//! Commands sent back to a running workflow by an observer (dashboard, CLI, relay client).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound control message. Tagged the same way as [`crate::WorkflowEvent`] so both
/// sides of a relay connection share one JSON shape convention.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    StepAdvance,
    StepInto,
    SetSingleStepMode { enabled: bool },
    SetStepIntoSubsteps { enabled: bool },
    SetMockLlm { enabled: bool, delay_ms: Option<u64> },
    CancelWorkflow,
    PauseWorkflow,
    ResumeWorkflow,
}

impl Command {
    /// Type guard: true iff `value`'s `type` tag is one of the eight known commands.
    /// A relay should call this before attempting to deserialize a frame from a client,
    /// since an unrecognized tag is a protocol violation, not a parse retry.
    pub fn is_known_type(value: &Value) -> bool {
        const KNOWN: &[&str] = &[
            "STEP_ADVANCE",
            "STEP_INTO",
            "SET_SINGLE_STEP_MODE",
            "SET_STEP_INTO_SUBSTEPS",
            "SET_MOCK_LLM",
            "CANCEL_WORKFLOW",
            "PAUSE_WORKFLOW",
            "RESUME_WORKFLOW",
        ];
        value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| KNOWN.contains(&t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_set_mock_llm_with_delay() {
        let cmd = Command::SetMockLlm {
            enabled: true,
            delay_ms: Some(250),
        };
        let v = serde_json::to_value(&cmd).unwrap();
        assert!(Command::is_known_type(&v));
        let back: Command = serde_json::from_value(v).unwrap();
        match back {
            Command::SetMockLlm { enabled, delay_ms } => {
                assert!(enabled);
                assert_eq!(delay_ms, Some(250));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unit_variant_serializes_without_payload() {
        let v = serde_json::to_value(Command::CancelWorkflow).unwrap();
        assert_eq!(v, serde_json::json!({"type": "CANCEL_WORKFLOW"}));
    }

    #[test]
    fn is_known_type_rejects_unrecognized_tag() {
        let v = serde_json::json!({"type": "DO_SOMETHING_ELSE"});
        assert!(!Command::is_known_type(&v));
    }
}
