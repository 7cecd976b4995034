//! Workflow event types (spec §4.5: type + payload).
//!
//! Each variant maps to a JSON object with `"type": "<variant_name>"`. Envelope
//! fields (workflow_id, node_id, event_id) are applied separately by [`crate::envelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One typed transition of a workflow run, emitted to any number of observers.
///
/// The fourteen variants are exhaustive: a type guard ([`WorkflowEvent::is_known_type`])
/// rejects anything whose `type` tag is not one of these when parsing raw JSON from an
/// untrusted source (e.g. a dashboard replaying recorded frames).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEvent {
    WorkflowStarted {
        workflow_id: String,
        name: String,
    },
    StepStarted {
        workflow_id: String,
        step_name: String,
    },
    StepCompleted {
        workflow_id: String,
        step_name: String,
        confidence: f64,
        quality_score: u8,
    },
    StepFailed {
        workflow_id: String,
        step_name: String,
        reason: String,
    },
    SubstepStarted {
        workflow_id: String,
        step_name: String,
        substep_name: String,
    },
    SubstepCompleted {
        workflow_id: String,
        step_name: String,
        substep_name: String,
    },
    BatchStarted {
        workflow_id: String,
        batch_id: String,
        batch_number: u32,
    },
    BatchCompleted {
        workflow_id: String,
        batch_id: String,
        batch_number: u32,
    },
    WorkflowPaused {
        workflow_id: String,
    },
    WorkflowResumed {
        workflow_id: String,
    },
    WorkflowCompleted {
        workflow_id: String,
    },
    WorkflowFailed {
        workflow_id: String,
        reason: String,
    },
    PreferencesUpdated {
        workflow_id: String,
        preferences: Value,
    },
    Heartbeat {
        workflow_id: String,
        status: String,
    },
}

impl WorkflowEvent {
    /// The workflow this event belongs to, so multiple clients can demultiplex a shared stream.
    pub fn workflow_id(&self) -> &str {
        match self {
            WorkflowEvent::WorkflowStarted { workflow_id, .. }
            | WorkflowEvent::StepStarted { workflow_id, .. }
            | WorkflowEvent::StepCompleted { workflow_id, .. }
            | WorkflowEvent::StepFailed { workflow_id, .. }
            | WorkflowEvent::SubstepStarted { workflow_id, .. }
            | WorkflowEvent::SubstepCompleted { workflow_id, .. }
            | WorkflowEvent::BatchStarted { workflow_id, .. }
            | WorkflowEvent::BatchCompleted { workflow_id, .. }
            | WorkflowEvent::WorkflowPaused { workflow_id }
            | WorkflowEvent::WorkflowResumed { workflow_id }
            | WorkflowEvent::WorkflowCompleted { workflow_id }
            | WorkflowEvent::WorkflowFailed { workflow_id, .. }
            | WorkflowEvent::PreferencesUpdated { workflow_id, .. }
            | WorkflowEvent::Heartbeat { workflow_id, .. } => workflow_id,
        }
    }

    /// Serializes this event to a JSON object (type + payload only; no envelope).
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Type guard: true iff `value`'s `type` tag is one of the fourteen known variants.
    /// Used to reject malformed frames from an untrusted observer before parsing.
    pub fn is_known_type(value: &Value) -> bool {
        const KNOWN: &[&str] = &[
            "WORKFLOW_STARTED",
            "STEP_STARTED",
            "STEP_COMPLETED",
            "STEP_FAILED",
            "SUBSTEP_STARTED",
            "SUBSTEP_COMPLETED",
            "BATCH_STARTED",
            "BATCH_COMPLETED",
            "WORKFLOW_PAUSED",
            "WORKFLOW_RESUMED",
            "WORKFLOW_COMPLETED",
            "WORKFLOW_FAILED",
            "PREFERENCES_UPDATED",
            "HEARTBEAT",
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
    fn workflow_id_accessor_covers_all_variants() {
        let events = vec![
            WorkflowEvent::WorkflowStarted {
                workflow_id: "w1".into(),
                name: "n".into(),
            },
            WorkflowEvent::Heartbeat {
                workflow_id: "w1".into(),
                status: "running".into(),
            },
        ];
        for e in events {
            assert_eq!(e.workflow_id(), "w1");
        }
    }

    #[test]
    fn is_known_type_accepts_all_tags() {
        let ev = WorkflowEvent::StepStarted {
            workflow_id: "w1".into(),
            step_name: "a".into(),
        };
        let v = ev.to_value().unwrap();
        assert!(WorkflowEvent::is_known_type(&v));
    }

    #[test]
    fn is_known_type_rejects_unknown_tag() {
        let v = serde_json::json!({"type": "NOT_A_REAL_EVENT"});
        assert!(!WorkflowEvent::is_known_type(&v));
    }

    #[test]
    fn serializes_with_screaming_snake_case_tag() {
        let ev = WorkflowEvent::WorkflowCompleted {
            workflow_id: "w1".into(),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"WORKFLOW_COMPLETED\""));
    }
}
