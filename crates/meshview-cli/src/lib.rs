//! meshview command-line interface.

pub mod config;
pub mod options;
pub mod output;
pub mod source;

use std::path::PathBuf;

use tracing::info;

use meshview_core::Result;
use meshview_dot::RenderOptions;

pub use config::MeshviewConfig;
pub use options::{ENV_URL, GraphOptions, SourceOptions, SourceSpec};
pub use output::{OutputKind, generate_output, render_snapshot, write_output};
pub use source::{FileSource, HttpSource, SnapshotSource, open_source};

/// Fully resolved options for one run.
#[derive(Debug, Clone)]
pub struct MeshviewOptions {
    pub source: SourceSpec,
    pub kind: OutputKind,
    pub render: RenderOptions,
    pub output: Option<PathBuf>,
}

/// Main entry point
///
/// Nothing is written unless the whole snapshot was fetched and rendered,
/// so a failed refresh leaves a previous output file in place.
pub fn run_main(opts: &MeshviewOptions) -> Result<()> {
    let source = open_source(&opts.source)?;
    info!(source = %source.describe(), kind = ?opts.kind, "starting");

    let content = generate_output(opts.kind, source.as_ref(), &opts.render)?;
    write_output(opts.output.as_deref(), &content)
}
