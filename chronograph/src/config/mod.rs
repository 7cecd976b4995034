//! Environment-variable readers recognized by the orchestration core (spec §6).

mod env;

pub use env::{batch_commit_count, knowledge_base_path, llm_batch_size};
