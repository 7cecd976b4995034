//! Encode a single `WorkflowEvent` as a JSON text frame.

use chronograph_event::WorkflowEvent;

pub(crate) fn encode_event(event: &WorkflowEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to serialize workflow event");
        serde_json::json!({"type": "HEARTBEAT", "workflow_id": "", "status": "serialization_error"})
            .to_string()
    })
}
