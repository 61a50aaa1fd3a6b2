#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use nodexl_core::config::{NodexlConfig, load_config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "nodexl",
    author,
    version,
    about = "nodexl: graph metrics for social network analysis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output. Shorthand for `--output json`.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Defaults to pretty on a terminal and text in a pipe.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputMode>,

    /// Configuration file. Defaults to `nodexl.toml` in the working
    /// directory, then the user config directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.output, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Metrics",
        about = "Calculate per-vertex metrics",
        long_about = "Calculate degree, centrality, clustering, PageRank and component \
                      membership for every vertex of a graph file.",
        after_help = "EXAMPLES:\n    # Configured default metrics\n    nodexl metrics karate.graphml\n\n    # Only betweenness and PageRank\n    nodexl metrics karate.net -m betweenness -m pagerank\n\n    # Simple edge list read as undirected\n    nodexl metrics edges.txt --directedness undirected --json"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(
        next_help_heading = "Metrics",
        about = "Calculate graph-wide metrics",
        long_about = "Calculate edge counts, density and component statistics for a whole \
                      graph, plus geodesic distances with --geodesics.",
        after_help = "EXAMPLES:\n    # Summary of a Pajek file\n    nodexl overall karate.net\n\n    # Include diameter and average geodesic distance\n    nodexl overall karate.net --geodesics\n\n    # Emit machine-readable output\n    nodexl overall karate.net --json"
    )]
    Overall(cmd::overall::OverallArgs),

    #[command(
        next_help_heading = "Metrics",
        about = "List connected components",
        long_about = "List the connected components of a graph, largest first unless \
                      configured or asked otherwise.",
        after_help = "EXAMPLES:\n    # Largest components first\n    nodexl components karate.graphml\n\n    # Smallest first\n    nodexl components karate.graphml --ascending"
    )]
    Components(cmd::components::ComponentsArgs),

    #[command(
        next_help_heading = "Interoperability",
        about = "Convert a graph between file formats",
        long_about = "Read a graph in one supported format and write it in another.",
        after_help = "EXAMPLES:\n    # Pajek to GraphML, formats from extensions\n    nodexl convert karate.net karate.graphml\n\n    # Explicit formats\n    nodexl convert edges.dat out.dl --from simple --to ucinet"
    )]
    Convert(cmd::convert::ConvertArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    nodexl completions bash\n\n    # Generate zsh completions\n    nodexl completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("NODEXL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "nodexl=debug,info"
        } else {
            "nodexl=info,warn"
        })
    });

    let format = env::var("NODEXL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_cli_config(cli: &Cli) -> anyhow::Result<NodexlConfig> {
    let working_dir = env::current_dir().context("cannot determine the working directory")?;
    let config = load_config(cli.config.as_deref(), &working_dir)?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = load_cli_config(cli)?;
    match &cli.command {
        Commands::Metrics(args) => cmd::metrics::run_metrics(args, &config, output),
        Commands::Overall(args) => {
            cmd::overall::run_overall(args, config.output.precision, output)
        }
        Commands::Components(args) => cmd::components::run_components(args, &config, output),
        Commands::Convert(args) => cmd::convert::run_convert(args, output),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error = CliError::from(&err);
            if render_error(output, &error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
