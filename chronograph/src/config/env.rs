//! Typed readers for the three environment variables the core recognizes
//! (spec §6). Malformed values fall back to the documented default rather than
//! failing — these knobs are tuning, not configuration the workflow depends on.

use std::path::PathBuf;

const DEFAULT_BATCH_COMMIT_COUNT: u32 = 50;
const DEFAULT_LLM_BATCH_SIZE: u32 = 20;

/// `BATCH_COMMIT_COUNT`: default batch size (default 50).
pub fn batch_commit_count() -> u32 {
    std::env::var("BATCH_COMMIT_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_BATCH_COMMIT_COUNT)
}

/// `LLM_BATCH_SIZE`: parallelism for classifier batched LLM calls, clamped to
/// [1, 50] (default 20).
pub fn llm_batch_size() -> u32 {
    std::env::var("LLM_BATCH_SIZE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .map(|v| v.clamp(1, 50))
        .unwrap_or(DEFAULT_LLM_BATCH_SIZE)
}

/// `KNOWLEDGE_BASE_PATH`: base directory for state files if not supplied in code.
pub fn knowledge_base_path() -> Option<PathBuf> {
    std::env::var("KNOWLEDGE_BASE_PATH").ok().map(PathBuf::from)
}
