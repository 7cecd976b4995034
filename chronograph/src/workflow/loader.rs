//! Workflow/Agent Configuration Loader: the single source of truth shared by the
//! orchestrator, the dashboard, and any diagram generator (spec §4.2).

use super::catalog::AgentCatalog;
use super::definition::WorkflowDefinition;
use super::error::{LoaderError, WorkflowValidationError};
use super::tuning::{AgentTuning, OrchestratorTuning, WorkflowRunnerTuning};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Validates a workflow definition against a catalog. Accumulates every violation
/// rather than stopping at the first — partial results are never returned (§4.2).
pub fn validate_workflow(
    definition: &WorkflowDefinition,
    catalog: &AgentCatalog,
) -> Vec<WorkflowValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let declared_steps: HashSet<&str> = definition.steps.iter().map(|s| s.name.as_str()).collect();

    for step in &definition.steps {
        if !seen.insert(step.name.as_str()) {
            errors.push(WorkflowValidationError::DuplicateStep {
                step: step.name.clone(),
            });
        }
        if !catalog.contains_agent_id(&step.agent_id) {
            errors.push(WorkflowValidationError::UnknownAgentId {
                step: step.name.clone(),
                agent_id: step.agent_id.clone(),
            });
        }
        for dependency in &step.dependencies {
            if !declared_steps.contains(dependency.as_str()) {
                errors.push(WorkflowValidationError::UnknownDependency {
                    step: step.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    for edge in &definition.visualization_edges {
        if !catalog.contains_agent_id(&edge.from) {
            errors.push(WorkflowValidationError::UnknownEdgeEndpoint {
                agent_id: edge.from.clone(),
            });
        }
        if !catalog.contains_agent_id(&edge.to) {
            errors.push(WorkflowValidationError::UnknownEdgeEndpoint {
                agent_id: edge.to.clone(),
            });
        }
    }

    errors
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| LoaderError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Caches parsed config per file until [`ConfigLoader::clear_cache`] is called
/// (spec §9: global singletons are acceptable only behind a reset primitive).
#[derive(Default)]
pub struct ConfigLoader {
    base_dir: PathBuf,
    catalog: RwLock<Option<Arc<AgentCatalog>>>,
    workflows: RwLock<HashMap<String, Arc<WorkflowDefinition>>>,
    orchestrator_tuning: RwLock<Option<Arc<OrchestratorTuning>>>,
    workflow_runner_tuning: RwLock<Option<Arc<WorkflowRunnerTuning>>>,
    agent_tuning: RwLock<Option<Arc<AgentTuning>>>,
}

impl ConfigLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    pub fn agent_catalog(&self) -> Result<Arc<AgentCatalog>, LoaderError> {
        if let Some(cached) = self.catalog.read().unwrap().clone() {
            return Ok(cached);
        }
        let catalog: AgentCatalog = read_yaml(&self.base_dir.join("agents.yaml"))?;
        let catalog = Arc::new(catalog);
        *self.catalog.write().unwrap() = Some(catalog.clone());
        Ok(catalog)
    }

    /// Loads and validates `workflows/<name>.yaml`. On any validation error, returns
    /// `Err` — never a partially-validated `WorkflowDefinition`.
    pub fn workflow(&self, name: &str) -> Result<Arc<WorkflowDefinition>, LoaderError> {
        if let Some(cached) = self.workflows.read().unwrap().get(name).cloned() {
            return Ok(cached);
        }
        let catalog = self.agent_catalog()?;
        let path = self.base_dir.join("workflows").join(format!("{name}.yaml"));
        let definition: WorkflowDefinition = read_yaml(&path)?;
        let errors = validate_workflow(&definition, &catalog);
        if !errors.is_empty() {
            return Err(LoaderError::Validation(errors));
        }
        let definition = Arc::new(definition);
        self.workflows
            .write()
            .unwrap()
            .insert(name.to_string(), definition.clone());
        Ok(definition)
    }

    pub fn orchestrator_tuning(&self) -> Result<Arc<OrchestratorTuning>, LoaderError> {
        if let Some(cached) = self.orchestrator_tuning.read().unwrap().clone() {
            return Ok(cached);
        }
        let path = self.base_dir.join("orchestrator.yaml");
        let tuning: OrchestratorTuning = if path.exists() {
            read_yaml(&path)?
        } else {
            OrchestratorTuning::default()
        };
        let tuning = Arc::new(tuning);
        *self.orchestrator_tuning.write().unwrap() = Some(tuning.clone());
        Ok(tuning)
    }

    pub fn workflow_runner_tuning(&self) -> Result<Arc<WorkflowRunnerTuning>, LoaderError> {
        if let Some(cached) = self.workflow_runner_tuning.read().unwrap().clone() {
            return Ok(cached);
        }
        let path = self.base_dir.join("workflow-runner.yaml");
        let tuning: WorkflowRunnerTuning = if path.exists() {
            read_yaml(&path)?
        } else {
            WorkflowRunnerTuning::default()
        };
        let tuning = Arc::new(tuning);
        *self.workflow_runner_tuning.write().unwrap() = Some(tuning.clone());
        Ok(tuning)
    }

    pub fn agent_tuning(&self) -> Result<Arc<AgentTuning>, LoaderError> {
        if let Some(cached) = self.agent_tuning.read().unwrap().clone() {
            return Ok(cached);
        }
        let path = self.base_dir.join("agent-tuning.yaml");
        let tuning: AgentTuning = if path.exists() {
            read_yaml(&path)?
        } else {
            AgentTuning::default()
        };
        let tuning = Arc::new(tuning);
        *self.agent_tuning.write().unwrap() = Some(tuning.clone());
        Ok(tuning)
    }

    /// Drops every cached value so the next load re-reads from disk. Tests must be
    /// able to drop all cached state (spec §9).
    pub fn clear_cache(&self) {
        *self.catalog.write().unwrap() = None;
        self.workflows.write().unwrap().clear();
        *self.orchestrator_tuning.write().unwrap() = None;
        *self.workflow_runner_tuning.write().unwrap() = None;
        *self.agent_tuning.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn sample_catalog_yaml() -> &'static str {
        r#"
orchestrator_node:
  id: orchestrator
  display_name: Orchestrator
agents:
  - id: git_reader
    display_name: Git Reader
  - id: semantic_analyzer
    display_name: Semantic Analyzer
step_mappings:
  read_commits: git_reader
  analyze: semantic_analyzer
"#
    }

    /// **Scenario**: a workflow whose every step and dependency is known loads and
    /// validates cleanly, and a second load is served from cache (no re-read).
    #[test]
    fn valid_workflow_loads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "agents.yaml", sample_catalog_yaml());
        write(
            dir.path(),
            "workflows/demo.yaml",
            r#"
name: demo
version: "1.0"
type: standard
steps:
  - name: read_commits
    agent_id: git_reader
    action: read
  - name: analyze
    agent_id: semantic_analyzer
    action: analyze
    dependencies: [read_commits]
"#,
        );
        let loader = ConfigLoader::new(dir.path());
        let definition = loader.workflow("demo").unwrap();
        assert_eq!(definition.steps.len(), 2);
        let again = loader.workflow("demo").unwrap();
        assert!(Arc::ptr_eq(&definition, &again));
    }

    /// **Scenario**: a step naming an unknown agent id and an undeclared dependency
    /// surfaces both errors at once — validation never returns a partial result.
    #[test]
    fn invalid_workflow_reports_every_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "agents.yaml", sample_catalog_yaml());
        write(
            dir.path(),
            "workflows/broken.yaml",
            r#"
name: broken
version: "1.0"
type: standard
steps:
  - name: analyze
    agent_id: nonexistent_agent
    action: analyze
    dependencies: [missing_step]
"#,
        );
        let loader = ConfigLoader::new(dir.path());
        let err = loader.workflow("broken").unwrap_err();
        match err {
            LoaderError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn clear_cache_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "agents.yaml", sample_catalog_yaml());
        let loader = ConfigLoader::new(dir.path());
        let first = loader.agent_catalog().unwrap();
        loader.clear_cache();
        let second = loader.agent_catalog().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_tuning_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "agents.yaml", sample_catalog_yaml());
        let loader = ConfigLoader::new(dir.path());
        let tuning = loader.orchestrator_tuning().unwrap();
        assert_eq!(tuning.max_retries, 3);
    }
}
