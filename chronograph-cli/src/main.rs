//! chronograph CLI: plan batches, validate workflow configuration, run a workflow
//! end to end against a demo agent registry, and serve the event relay.
//!
//! Subcommands: `plan`, `validate`, `run`, `serve`.

mod demo_agents;
mod log_format;
mod logging;

use chronograph::scheduler::Git2CommitSource;
use chronograph::{BatchScheduler, ConfigLoader, PlanRequest, SmartOrchestrator};
use chronograph_event::Command as RelayCommand;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Parser, Debug)]
#[command(name = "chronograph")]
#[command(about = "chronograph — orchestration core for a knowledge-graph construction pipeline")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Partition a repository's commit history into chronological batches and persist the plan.
    Plan(PlanArgs),
    /// Load and validate a workflow definition against the agent catalog.
    Validate(ValidateArgs),
    /// Execute a workflow against a passthrough demo agent registry.
    Run(RunArgs),
    /// Run the WebSocket event relay.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct PlanArgs {
    /// Path to the git repository.
    #[arg(long, value_name = "PATH")]
    repo: PathBuf,
    /// Team identifier (scopes the checkpoint/progress files).
    #[arg(long, default_value = "default")]
    team: String,
    /// Directory to persist batch-checkpoints.json / batch-progress.json in.
    #[arg(long, value_name = "DIR")]
    state_dir: PathBuf,
    /// Commits per batch.
    #[arg(long, default_value_t = 50)]
    batch_size: u32,
    /// Cap on pending batches produced by this planning pass.
    #[arg(long)]
    max_batches: Option<u32>,
    /// Resume from a prior checkpoint in `state_dir`, if any.
    #[arg(long)]
    resume: bool,
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    /// Directory containing agents.yaml and workflows/<name>.yaml.
    #[arg(long, value_name = "DIR")]
    config_dir: PathBuf,
    /// Workflow name (file stem under workflows/).
    name: String,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Directory containing agents.yaml and workflows/<name>.yaml.
    #[arg(long, value_name = "DIR")]
    config_dir: PathBuf,
    /// Workflow name (file stem under workflows/).
    name: String,
    /// Workflow run identifier. Defaults to `<name>-run`.
    #[arg(long)]
    workflow_id: Option<String>,
    /// Initial input payload, as a JSON literal.
    #[arg(long, default_value = "null")]
    input: String,
    /// Also serve the run's event stream and accept control commands over WebSocket.
    #[arg(long)]
    serve: bool,
    /// WebSocket listen address when `--serve` is given (default 127.0.0.1:8080).
    #[arg(long, value_name = "ADDR")]
    addr: Option<String>,
    /// Keep the relay running after the run completes (default: exit once it does).
    #[arg(long)]
    keep_alive: bool,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Directory containing agents.yaml and workflows/<name>.yaml.
    #[arg(long, value_name = "DIR")]
    config_dir: PathBuf,
    /// Workflow name (file stem under workflows/).
    name: String,
    /// Workflow run identifier. Defaults to `<name>-run`.
    #[arg(long)]
    workflow_id: Option<String>,
    /// Initial input payload, as a JSON literal.
    #[arg(long, default_value = "null")]
    input: String,
    /// WebSocket listen address (default 127.0.0.1:8080).
    #[arg(long, value_name = "ADDR")]
    addr: Option<String>,
    /// Keep the relay running after the run completes (default: exit once it does).
    #[arg(long)]
    keep_alive: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    chronograph_config::load_and_apply("chronograph", None::<&std::path::Path>).ok();
    logging::init()?;

    let args = Args::parse();
    match args.cmd {
        Command::Plan(a) => run_plan(a),
        Command::Validate(a) => run_validate(a),
        Command::Run(a) => run_workflow(a).await,
        Command::Serve(a) => run_serve(a).await,
    }
}

fn run_plan(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = args.repo.to_string_lossy().to_string();
    let source = Git2CommitSource::new(&args.repo);
    let scheduler = BatchScheduler::new(repo, args.team, source, args.state_dir);
    scheduler.plan(PlanRequest {
        batch_size: args.batch_size,
        max_batches: args.max_batches,
        from_commit: None,
        resume_from_checkpoint: args.resume,
    });

    let batches = scheduler.batches();
    println!("{}", serde_json::to_string_pretty(&batches)?);
    eprintln!("planned {} batch(es)", batches.len());
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ConfigLoader::new(args.config_dir);
    match loader.workflow(&args.name) {
        Ok(definition) => {
            println!("workflow '{}' is valid ({} steps)", definition.name, definition.steps.len());
            Ok(())
        }
        Err(err) => {
            eprintln!("workflow '{}' failed validation: {}", args.name, err);
            std::process::exit(1);
        }
    }
}

/// Drives a running [`SmartOrchestrator`] from inbound relay commands: `STEP_ADVANCE`,
/// `SET_SINGLE_STEP_MODE`, `CANCEL_WORKFLOW`, `PAUSE_WORKFLOW`, and `RESUME_WORKFLOW`
/// each call straight through to the matching orchestrator method (spec §4.5). The
/// remaining commands (mock LLM delay, step-into-substeps) have no orchestrator-side
/// effect yet and are only logged.
fn spawn_command_loop(
    orchestrator: Arc<SmartOrchestrator>,
    mut commands_rx: tokio::sync::mpsc::Receiver<RelayCommand>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands_rx.recv().await {
            match command {
                RelayCommand::StepAdvance => orchestrator.advance_single_step(),
                RelayCommand::SetSingleStepMode { enabled } => orchestrator.set_single_step_mode(enabled),
                RelayCommand::CancelWorkflow => orchestrator.cancel(),
                RelayCommand::PauseWorkflow => orchestrator.pause(),
                RelayCommand::ResumeWorkflow => orchestrator.resume(),
                other => tracing::info!(?other, "command has no orchestrator-side effect yet"),
            }
        }
    })
}

async fn run_workflow(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ConfigLoader::new(args.config_dir);
    let definition = loader.workflow(&args.name)?;
    let tuning = loader.orchestrator_tuning()?;
    let runner_tuning = loader.workflow_runner_tuning()?;
    let registry = demo_agents::build_passthrough_registry(&definition);
    let workflow_id = args.workflow_id.unwrap_or_else(|| format!("{}-run", args.name));
    let input: serde_json::Value = serde_json::from_str(&args.input)?;

    let orchestrator = Arc::new(SmartOrchestrator::with_runner_tuning(
        workflow_id,
        (*definition).clone(),
        registry,
        *tuning,
        *runner_tuning,
        None,
    ));

    let (commands_tx, commands_rx) = tokio::sync::mpsc::channel(32);
    let command_loop = spawn_command_loop(orchestrator.clone(), commands_rx);

    let mut events = orchestrator.subscribe();
    let logger = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "workflow event");
        }
    });

    let relay = if args.serve {
        let addr = args.addr.clone();
        let once = !args.keep_alive;
        let events_tx = orchestrator.events_sender();
        Some(tokio::spawn(async move {
            if let Err(err) = chronograph_relay::run_relay(addr.as_deref(), once, events_tx, commands_tx).await {
                tracing::error!(%err, "relay exited with an error");
            }
        }))
    } else {
        drop(commands_tx);
        None
    };

    let state = orchestrator.run(input).await?;
    logger.abort();
    command_loop.abort();
    if let Some(relay) = relay {
        relay.abort();
    }

    println!("{}", serde_json::to_string_pretty(&state)?);
    match state.status {
        chronograph::WorkflowStatus::Completed => Ok(()),
        _ => std::process::exit(1),
    }
}

async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ConfigLoader::new(args.config_dir);
    let definition = loader.workflow(&args.name)?;
    let tuning = loader.orchestrator_tuning()?;
    let runner_tuning = loader.workflow_runner_tuning()?;
    let registry = demo_agents::build_passthrough_registry(&definition);
    let workflow_id = args.workflow_id.unwrap_or_else(|| format!("{}-run", args.name));
    let input: serde_json::Value = serde_json::from_str(&args.input)?;

    let orchestrator = Arc::new(SmartOrchestrator::with_runner_tuning(
        workflow_id,
        (*definition).clone(),
        registry,
        *tuning,
        *runner_tuning,
        None,
    ));

    let (commands_tx, commands_rx) = tokio::sync::mpsc::channel(32);
    let command_loop = spawn_command_loop(orchestrator.clone(), commands_rx);

    let events_tx = orchestrator.events_sender();
    let addr = args.addr.clone();
    let once = !args.keep_alive;
    let relay = tokio::spawn(async move {
        if let Err(err) = chronograph_relay::run_relay(addr.as_deref(), once, events_tx, commands_tx).await {
            tracing::error!(%err, "relay exited with an error");
        }
    });

    let state = orchestrator.run(input).await?;
    command_loop.abort();
    relay.abort();

    println!("{}", serde_json::to_string_pretty(&state)?);
    match state.status {
        chronograph::WorkflowStatus::Completed => Ok(()),
        _ => std::process::exit(1),
    }
}
