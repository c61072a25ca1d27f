use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use meshview::{
    ENV_URL, GraphOptions, MeshviewConfig, MeshviewOptions, OutputKind, SourceOptions, run_main,
};
use meshview_core::Result;

#[derive(Parser, Debug)]
#[command(
    name = "meshview",
    about = "meshview: render peer network snapshots as graphs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file with [source] and [render] sections
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    source: SourceOptions,

    #[command(flatten)]
    graph: GraphOptions,

    /// Output file path (writes to file instead of stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE", global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Render the peer graph as DOT for a static renderer
    Dot,
    /// Emit the node/edge view model as JSON for an interactive renderer
    View {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the backend's DAG description unchanged
    Dag,
    /// List canonical peer links
    Edges,
}

impl From<Command> for OutputKind {
    fn from(command: Command) -> Self {
        match command {
            Command::Dot => OutputKind::Dot,
            Command::View { pretty } => OutputKind::View { pretty },
            Command::Dag => OutputKind::Dag,
            Command::Edges => OutputKind::Edges,
        }
    }
}

pub fn run(args: Cli) -> Result<()> {
    let total_start = Instant::now();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &args.config {
        Some(path) => MeshviewConfig::from_path(path)?,
        None => MeshviewConfig::default(),
    };

    let opts = MeshviewOptions {
        source: args.source.resolve(&config, std::env::var(ENV_URL).ok())?,
        kind: args.command.into(),
        render: args.graph.resolve(&config),
        output: args.output,
    };

    if let Err(e) = run_main(&opts) {
        if e.kind().is_snapshot_error() {
            tracing::error!(error = %e, "snapshot rejected, nothing written");
        } else {
            tracing::error!(error = %e, "execution failed");
        }
        return Err(e);
    }

    tracing::info!(total_secs = total_start.elapsed().as_secs_f64(), "complete");
    Ok(())
}

pub fn main() -> Result<()> {
    let args = Cli::parse();
    run(args)
}
