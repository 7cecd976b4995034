//! A demo agent registry for smoke-testing a workflow from the command line.
//!
//! Concrete agents (git reader, semantic analyzer, ontology classifier, ...) are
//! external collaborators the core only specifies by envelope contract; this CLI
//! ships none of them. `build_passthrough_registry` wires every agent id referenced
//! by a workflow's steps to a [`LegacyAdapter`] that echoes its input back as output
//! at the default confidence, so `chronograph run` has something real to execute
//! end to end without requiring a production agent fleet.

use chronograph::{AgentRegistry, LegacyAdapter, WorkflowDefinition};
use std::sync::Arc;

pub fn build_passthrough_registry(definition: &WorkflowDefinition) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for step in &definition.steps {
        if registry.get(&step.agent_id).is_some() {
            continue;
        }
        let agent_id = step.agent_id.clone();
        let adapter = LegacyAdapter::new(agent_id.clone(), move |input| {
            Box::pin(async move { Ok(input) })
        });
        registry.register(agent_id, Arc::new(adapter));
    }
    registry
}
