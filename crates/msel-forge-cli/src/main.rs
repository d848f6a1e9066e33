// crates/msel-forge-cli/src/main.rs
// ============================================================================
// Module: MSEL Forge CLI Entry Point
// Description: Command dispatcher for seeding, generation, and trace review.
// Purpose: Provide an operator CLI over the scenario-generation engine.
// Dependencies: clap, msel-forge-config, msel-forge-core, msel-forge-providers,
// msel-forge-store-graph, serde_json
// ============================================================================

//! ## Overview
//! The CLI seeds the infrastructure graph, runs scenario generation (with
//! interactive decision prompts on stdin), and reviews forensic trace files.
//! Configuration comes from a TOML file plus environment overrides; invalid
//! configuration is fatal before any run begins.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod backends;
mod trace_review;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use msel_forge_config::MselForgeConfig;
use msel_forge_core::ChoiceId;
use msel_forge_core::Controller;
use msel_forge_core::ControllerConfig;
use msel_forge_core::CriticAgent;
use msel_forge_core::Engine;
use msel_forge_core::GenerateRequest;
use msel_forge_core::GenerationMode;
use msel_forge_core::InfrastructureTemplate;
use msel_forge_core::IntelProvider;
use msel_forge_core::JsonlTraceSink;
use msel_forge_core::RunReport;
use msel_forge_core::ScenarioId;
use msel_forge_core::ScenarioType;
use msel_forge_core::StateStore;
use msel_forge_core::Timestamp;

use crate::backends::AnyGraph;
use crate::backends::AnyVector;
use crate::backends::build_graph;
use crate::backends::build_model;
use crate::backends::build_vector;

// ============================================================================
// SECTION: Command Line Definition
// ============================================================================

/// MSEL Forge: crisis-exercise scenario generation for financial institutions.
#[derive(Debug, Parser)]
#[command(name = "msel-forge", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the infrastructure graph with the enterprise template.
    Seed {
        /// Use the in-memory graph (dry run) instead of the configured one.
        #[arg(long)]
        offline: bool,
    },
    /// Generate one scenario.
    Generate {
        /// Scenario archetype.
        #[arg(long, value_enum)]
        scenario_type: ScenarioTypeArg,
        /// Explicit scenario identifier.
        #[arg(long)]
        scenario_id: Option<String>,
        /// Inject budget (defaults to the configured value).
        #[arg(long)]
        max_iterations: Option<u32>,
        /// Validation mode.
        #[arg(long, value_enum, default_value = "thesis")]
        mode: ModeArg,
        /// Raise decision points and prompt on stdin.
        #[arg(long)]
        interactive: bool,
        /// Compliance standards to evaluate (repeatable).
        #[arg(long = "compliance", default_values = ["DORA"])]
        compliance_standards: Vec<String>,
        /// Use the in-memory graph seeded with the enterprise template.
        #[arg(long)]
        offline: bool,
        /// Emit the full run report as JSON instead of a timeline.
        #[arg(long)]
        json: bool,
    },
    /// List scenario identifiers recorded in a forensic trace file.
    List {
        /// Trace file to read (defaults to the configured path).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show the accepted timeline recorded for one scenario.
    Show {
        /// Scenario identifier.
        scenario_id: String,
        /// Trace file to read (defaults to the configured path).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Print the raw trace records for one scenario.
    Logs {
        /// Scenario identifier.
        scenario_id: String,
        /// Trace file to read (defaults to the configured path).
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

/// Scenario archetype argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioTypeArg {
    /// Ransomware with double extortion.
    RansomwareDoubleExtortion,
    /// DDoS against critical functions.
    DdosCriticalFunctions,
    /// Supply chain compromise.
    SupplyChainCompromise,
    /// Insider threat with data manipulation.
    InsiderThreatDataManipulation,
}

impl From<ScenarioTypeArg> for ScenarioType {
    fn from(value: ScenarioTypeArg) -> Self {
        match value {
            ScenarioTypeArg::RansomwareDoubleExtortion => Self::RansomwareDoubleExtortion,
            ScenarioTypeArg::DdosCriticalFunctions => Self::DdosCriticalFunctions,
            ScenarioTypeArg::SupplyChainCompromise => Self::SupplyChainCompromise,
            ScenarioTypeArg::InsiderThreatDataManipulation => Self::InsiderThreatDataManipulation,
        }
    }
}

/// Validation mode argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Full symbolic validation.
    Thesis,
    /// A/B measurement mode (no checks).
    Legacy,
}

impl From<ModeArg> for GenerationMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Thesis => Self::Thesis,
            ModeArg::Legacy => Self::Legacy,
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            let mut err = std::io::stderr();
            let _ = writeln!(err, "error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the parsed command.
fn run(cli: &Cli) -> Result<(), String> {
    let config =
        MselForgeConfig::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    match &cli.command {
        Command::Seed {
            offline,
        } => seed(&config, *offline),
        Command::Generate {
            scenario_type,
            scenario_id,
            max_iterations,
            mode,
            interactive,
            compliance_standards,
            offline,
            json,
        } => generate(
            &config,
            GenerateArgs {
                scenario_type: (*scenario_type).into(),
                scenario_id: scenario_id.clone(),
                max_iterations: (*max_iterations)
                    .unwrap_or(config.engine.default_max_iterations),
                mode: (*mode).into(),
                interactive: *interactive,
                compliance_standards: compliance_standards.clone(),
                offline: *offline,
                json: *json,
            },
        ),
        Command::List {
            log,
        } => trace_review::list(&resolve_log(&config, log.as_ref())),
        Command::Show {
            scenario_id,
            log,
        } => trace_review::show(&resolve_log(&config, log.as_ref()), scenario_id),
        Command::Logs {
            scenario_id,
            log,
        } => trace_review::logs(&resolve_log(&config, log.as_ref()), scenario_id),
    }
}

/// Resolves the trace file path for review commands.
fn resolve_log(config: &MselForgeConfig, cli_path: Option<&PathBuf>) -> PathBuf {
    cli_path.cloned().unwrap_or_else(|| config.trace.forensic_log_path.clone())
}

// ============================================================================
// SECTION: Seed Command
// ============================================================================

/// Seeds the enterprise template and reports the entity count.
fn seed(config: &MselForgeConfig, offline: bool) -> Result<(), String> {
    let graph = build_graph(config, offline)?;
    let store = StateStore::new(graph);
    let count =
        store.seed_infrastructure(&InfrastructureTemplate::Enterprise).map_err(|err| {
            format!("seeding failed: {err}")
        })?;
    let mut out = std::io::stdout();
    writeln!(out, "seeded {count} entities").map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Generate Command
// ============================================================================

/// Resolved arguments for the generate command.
struct GenerateArgs {
    /// Scenario archetype.
    scenario_type: ScenarioType,
    /// Explicit scenario identifier.
    scenario_id: Option<String>,
    /// Inject budget.
    max_iterations: u32,
    /// Validation mode.
    mode: GenerationMode,
    /// Whether decision points are prompted.
    interactive: bool,
    /// Compliance standards to evaluate.
    compliance_standards: Vec<String>,
    /// Use the in-memory graph.
    offline: bool,
    /// Emit the report as JSON.
    json: bool,
}

/// Runs one generation, prompting for decisions when interactive.
fn generate(config: &MselForgeConfig, args: GenerateArgs) -> Result<(), String> {
    let graph = build_graph(config, args.offline)?;
    let store = StateStore::new(graph);
    if args.offline {
        store
            .seed_infrastructure(&InfrastructureTemplate::Enterprise)
            .map_err(|err| format!("offline seeding failed: {err}"))?;
    }
    let model = build_model(config)?;
    let intel = build_vector(config)?;
    let trace = JsonlTraceSink::open(&config.trace.forensic_log_path)
        .map_err(|err| format!("trace sink unavailable: {err}"))?;
    let controller: Controller<_, AnyGraph, AnyVector, _> = Controller::new(
        model,
        store,
        IntelProvider::new(intel),
        trace,
        CriticAgent::with_builtins(),
        ControllerConfig::default(),
    );
    let engine = Engine::new(controller);

    let start_time = Timestamp::start();
    let request = GenerateRequest {
        scenario_type: args.scenario_type,
        scenario_id: args.scenario_id.map(ScenarioId::new),
        max_iterations: args.max_iterations,
        mode: args.mode,
        interactive: args.interactive,
        compliance_standards: args.compliance_standards,
        start_time,
    };
    let mut report = engine.generate_scenario(&request).map_err(|err| err.to_string())?;

    while let Some(pending) = report.pending_decision.clone() {
        let choice = prompt_decision(&pending)?;
        report = engine
            .supply_decision(&report.scenario_id, &choice)
            .map_err(|err| err.to_string())?;
    }

    render_report(&report, args.json)
}

/// Presents the pending options and reads a choice from stdin.
fn prompt_decision(
    pending: &msel_forge_core::PendingDecision,
) -> Result<ChoiceId, String> {
    let mut out = std::io::stdout();
    writeln!(out, "decision required ({} phase):", pending.phase).map_err(|err| err.to_string())?;
    for option in &pending.options {
        writeln!(out, "  [{}] {} - {}", option.choice_id, option.label, option.description)
            .map_err(|err| err.to_string())?;
    }
    writeln!(out, "choice id:").map_err(|err| err.to_string())?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| format!("stdin unavailable: {err}"))?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err("no choice supplied".to_string());
    }
    Ok(ChoiceId::new(trimmed))
}

/// Renders the run report as a timeline or JSON document.
fn render_report(report: &RunReport, json: bool) -> Result<(), String> {
    let mut out = std::io::stdout();
    if json {
        let rendered =
            serde_json::to_string_pretty(report).map_err(|err| err.to_string())?;
        return writeln!(out, "{rendered}").map_err(|err| err.to_string());
    }
    writeln!(out, "scenario {}", report.scenario_id).map_err(|err| err.to_string())?;
    for inject in &report.injects {
        writeln!(
            out,
            "{} {} [{}] {} -> {} via {}: {}",
            inject.inject_id,
            inject.time_offset,
            inject.phase,
            inject.source,
            inject.target,
            inject.modality,
            inject.content
        )
        .map_err(|err| err.to_string())?;
    }
    if let Some(end) = report.end_condition {
        writeln!(out, "ended: {end}").map_err(|err| err.to_string())?;
    }
    if !report.warnings.is_empty() {
        writeln!(out, "warnings: {}", report.warnings.len()).map_err(|err| err.to_string())?;
    }
    if !report.errors.is_empty() {
        writeln!(out, "errors: {}", report.errors.len()).map_err(|err| err.to_string())?;
    }
    Ok(())
}
