//! crowdsim - crowd simulation runner.
//!
//! - `crowdsim run <project.yaml>` - generate agents and simulate the frame range
//! - `crowdsim check <graph.json>` - compile a graph and print its plan
//! - `crowdsim capabilities` - list control operations and node kinds

mod project;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crowd_core::FrameRange;
use crowd_graph::compile;
use tracing_subscriber::{fmt, EnvFilter};

use crate::project::{load_graph, Project};

#[derive(Parser)]
#[command(name = "crowdsim")]
#[command(about = "Crowd simulation runner", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate agents and run the simulation to the end of its range
    Run {
        /// Project manifest (YAML)
        project: PathBuf,

        /// Override the first frame
        #[arg(long)]
        start: Option<u64>,

        /// Override the last frame
        #[arg(long)]
        end: Option<u64>,

        /// Override the seed
        #[arg(long)]
        seed: Option<u64>,

        /// Evaluate agents on a single thread
        #[arg(long)]
        sequential: bool,

        /// Print final agents as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a graph file and print the evaluation order
    Check {
        /// Graph document (JSON)
        graph: PathBuf,
    },

    /// List control operations, generation operations and node kinds
    Capabilities,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run {
            project,
            start,
            end,
            seed,
            sequential,
            json,
        }) => run(project, start, end, seed, sequential, json),
        Some(Commands::Check { graph }) => check(graph),
        Some(Commands::Capabilities) => {
            show_capabilities();
            Ok(())
        }
        None => {
            println!("crowdsim - crowd simulation runner");
            println!();
            println!("Usage: crowdsim <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run           Simulate a project");
            println!("  check         Compile a graph file");
            println!("  capabilities  List operations and node kinds");
            println!();
            println!("Run 'crowdsim --help' for more information.");
            Ok(())
        }
    }
}

fn run(
    path: PathBuf,
    start: Option<u64>,
    end: Option<u64>,
    seed: Option<u64>,
    sequential: bool,
    json: bool,
) -> Result<()> {
    let mut project = Project::load(&path)?;
    let config = &mut project.manifest.sim;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if sequential {
        config.parallel = false;
    }
    let range = FrameRange::new(
        start.unwrap_or(config.start_frame),
        end.unwrap_or(config.end_frame),
    );

    tracing::info!(project = %path.display(), start = range.start, end = range.end, "Loading project");

    let mut sim = project.into_simulation();
    sim.start(range)
        .with_context(|| format!("Failed to start {}", path.display()))?;
    let reports = sim.run_to_end()?;

    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    let over_budget = reports.iter().filter(|r| r.over_budget).count();
    tracing::info!(
        frames = reports.len(),
        failures,
        over_budget,
        "Simulation finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(sim.agents())?);
        return Ok(());
    }

    println!("{} agents after {} frames", sim.agents().len(), reports.len());
    for agent in sim.agents() {
        let p = agent.transform.position;
        let r = agent.transform.rotation;
        println!(
            "  {} [{}] pos=({:.3}, {:.3}, {:.3}) rot=({:.1}, {:.1}, {:.1}){}",
            agent.id,
            agent.brain(),
            p.x,
            p.y,
            p.z,
            r.x,
            r.y,
            r.z,
            match agent.last_failed_frame {
                Some(frame) => format!(" last failure at frame {frame}"),
                None => String::new(),
            }
        );
    }
    Ok(())
}

fn check(path: PathBuf) -> Result<()> {
    let graph = load_graph(&path)?;
    let plan = compile(&graph).with_context(|| format!("{} does not compile", path.display()))?;

    println!("{} ({} graph): {} steps", plan.graph_name(), plan.kind(), plan.len());
    for (index, step) in plan.steps().iter().enumerate() {
        let marker = if plan.sinks().contains(&index) {
            " (sink)"
        } else if plan.stateful_steps().contains(&index) {
            " (stateful)"
        } else {
            ""
        };
        println!("  {index:>3}. {} [{}]{marker}", step.name, step.kind);
    }
    if !plan.pruned().is_empty() {
        let pruned: Vec<String> = plan
            .pruned()
            .iter()
            .filter_map(|id| graph.node(*id).map(|n| n.name().to_string()))
            .collect();
        println!("  unused: {}", pruned.join(", "));
    }
    Ok(())
}

fn show_capabilities() {
    let caps = crowd_sim::capabilities();
    println!("Control: {}", caps.control.join(", "));
    println!("Generation: {}", caps.generation.join(", "));
    println!("Brain nodes: {}", caps.brain_nodes.join(", "));
    println!("Generation nodes: {}", caps.generation_nodes.join(", "));
}
