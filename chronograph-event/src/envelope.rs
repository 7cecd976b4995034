//! Envelope (workflow_id, node_id, event_id) wrapped around every emitted event.
//! `EnvelopeState` tracks the current step and injects the envelope into each event.

use crate::event::WorkflowEvent;
use serde_json::Value;

/// Envelope fields attached to each event so an observer can demultiplex a shared stream
/// and detect gaps or reordering.
#[derive(Clone, Debug, Default)]
pub struct Envelope {
    /// Workflow ID; constant across a single workflow run.
    pub workflow_id: Option<String>,
    /// Identifier of the step currently executing when this event was emitted.
    pub node_id: Option<String>,
    /// Per-event sequence number; monotonically increasing within a stream.
    pub event_id: Option<u64>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workflow_id(mut self, id: impl Into<String>) -> Self {
        self.workflow_id = Some(id.into());
        self
    }

    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    pub fn with_event_id(mut self, id: u64) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Merges envelope fields into the given JSON object (top-level only).
    /// Does not overwrite existing keys.
    pub fn inject_into(&self, obj: &mut Value) {
        let Some(obj) = obj.as_object_mut() else {
            return;
        };
        if let Some(ref id) = self.workflow_id {
            obj.entry("workflow_id")
                .or_insert_with(|| Value::String(id.clone()));
        }
        if let Some(ref id) = self.node_id {
            obj.entry("node_id")
                .or_insert_with(|| Value::String(id.clone()));
        }
        if let Some(id) = self.event_id {
            obj.entry("event_id")
                .or_insert_with(|| Value::Number(serde_json::Number::from(id)));
        }
    }
}

/// Envelope state for one run: workflow_id, current step id, next event_id.
pub struct EnvelopeState {
    pub workflow_id: String,
    pub current_node_id: String,
    pub node_run_seq: u64,
    pub next_event_id: u64,
}

impl EnvelopeState {
    pub fn new(workflow_id: String) -> Self {
        Self {
            workflow_id,
            current_node_id: String::new(),
            node_run_seq: 0,
            next_event_id: 1,
        }
    }

    /// Injects envelope into the event value and advances state.
    /// On `StepStarted`, updates current_node_id from the event's `step_name`.
    pub fn inject_into(&mut self, event: &WorkflowEvent, value: &mut Value) {
        if let WorkflowEvent::StepStarted { step_name, .. } = event {
            self.current_node_id = format!("run-{}-{}", step_name, self.node_run_seq);
            self.node_run_seq += 1;
        }
        let node_id = if self.current_node_id.is_empty() {
            "run-0"
        } else {
            self.current_node_id.as_str()
        };
        let env = Envelope::new()
            .with_workflow_id(&self.workflow_id)
            .with_node_id(node_id)
            .with_event_id(self.next_event_id);
        self.next_event_id += 1;
        env.inject_into(value);
    }

    /// Builds the envelope for a reply that is not itself a `WorkflowEvent` (e.g. an ack).
    pub fn reply_envelope(&self) -> Envelope {
        let node_id = if self.current_node_id.is_empty() {
            "run-0"
        } else {
            self.current_node_id.as_str()
        };
        Envelope::new()
            .with_workflow_id(&self.workflow_id)
            .with_node_id(node_id)
            .with_event_id(self.next_event_id)
    }
}

/// Converts a workflow event to JSON and injects the envelope using the given state.
/// Returns the final value (type + payload + workflow_id, node_id, event_id).
pub fn to_json(
    event: &WorkflowEvent,
    state: &mut EnvelopeState,
) -> Result<Value, serde_json::Error> {
    let mut value = event.to_value()?;
    state.inject_into(event, &mut value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_inject() {
        let mut obj = serde_json::json!({"type":"STEP_STARTED","step_name":"convert"});
        let env = Envelope::new()
            .with_workflow_id("wf-1")
            .with_node_id("run-convert-1")
            .with_event_id(1);
        env.inject_into(&mut obj);
        assert_eq!(obj["workflow_id"], "wf-1");
        assert_eq!(obj["node_id"], "run-convert-1");
        assert_eq!(obj["event_id"], 1);
        assert_eq!(obj["type"], "STEP_STARTED");
    }

    #[test]
    fn to_json_injects_envelope_and_tracks_current_step() {
        let ev = WorkflowEvent::StepStarted {
            workflow_id: "wf-123".to_string(),
            step_name: "convert".to_string(),
        };
        let mut state = EnvelopeState::new("wf-123".to_string());
        let value = to_json(&ev, &mut state).unwrap();
        assert_eq!(value["type"], "STEP_STARTED");
        assert_eq!(value["step_name"], "convert");
        assert_eq!(value["workflow_id"], "wf-123");
        assert_eq!(value["event_id"], 1);
        assert_eq!(state.current_node_id, "run-convert-0");
    }

    #[test]
    fn event_ids_increase_monotonically() {
        let mut state = EnvelopeState::new("wf-1".to_string());
        let first = to_json(
            &WorkflowEvent::WorkflowStarted {
                workflow_id: "wf-1".to_string(),
                name: "demo".to_string(),
            },
            &mut state,
        )
        .unwrap();
        let second = to_json(
            &WorkflowEvent::WorkflowCompleted {
                workflow_id: "wf-1".to_string(),
            },
            &mut state,
        )
        .unwrap();
        assert_eq!(first["event_id"], 1);
        assert_eq!(second["event_id"], 2);
    }
}
