//! Event protocol: type + payload + envelope.
//!
//! This crate defines the wire shape of a single workflow event, the inbound
//! command union, and envelope injection. It does not depend on `chronograph` —
//! the orchestrator bridges its internal state transitions into [`WorkflowEvent`]
//! and calls [`to_json`].

pub mod command;
pub mod envelope;
pub mod event;

pub use command::Command;
pub use envelope::{to_json, Envelope, EnvelopeState};
pub use event::WorkflowEvent;
