//! Output generation (DOT graphs, view models, edge lists).

use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::info;

use meshview_collect::{Edge, build_view_model, canonicalize};
use meshview_core::{Error, Result, Snapshot, resolve_label_with};
use meshview_dot::{RenderOptions, render_peer_graph};

use crate::source::SnapshotSource;

/// What to produce from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// DOT text for the static renderer.
    Dot,
    /// View model JSON for the interactive renderer.
    View { pretty: bool },
    /// The backend's DAG text, untouched.
    Dag,
    /// Canonical edges, one `from -- to` line each.
    Edges,
}

/// Fetch from `source` and build the requested output.
pub fn generate_output(
    kind: OutputKind,
    source: &dyn SnapshotSource,
    options: &RenderOptions,
) -> Result<String> {
    if kind == OutputKind::Dag {
        return source.dag();
    }

    let fetch_start = Instant::now();
    let snapshot = source.peer_graph()?;
    info!(
        source = %source.describe(),
        nodes = snapshot.len(),
        entries = snapshot.directed_entries(),
        "Snapshot loaded: {:.2}s",
        fetch_start.elapsed().as_secs_f64()
    );

    render_snapshot(kind, &snapshot, options)
}

/// Build the requested output from an already loaded snapshot.
pub fn render_snapshot(
    kind: OutputKind,
    snapshot: &Snapshot,
    options: &RenderOptions,
) -> Result<String> {
    let render_start = Instant::now();
    let result = match kind {
        OutputKind::Dot => render_peer_graph(snapshot, options)?,
        OutputKind::View { pretty } => {
            let model = build_view_model(snapshot, &options.collect)?;
            let json = if pretty {
                serde_json::to_string_pretty(&model)
            } else {
                serde_json::to_string(&model)
            };
            let mut json = json.map_err(|err| {
                Error::serialization_failed(err.to_string())
                    .with_operation("cli::output")
                    .set_source(err)
            })?;
            json.push('\n');
            json
        }
        OutputKind::Edges => {
            let edges = canonicalize(snapshot, &options.collect)?;
            format_edges(&edges, options.collect.delimiter)
        }
        OutputKind::Dag => {
            return Err(Error::unsupported("dag text is not derived from a snapshot")
                .with_operation("cli::output"));
        }
    };

    info!("Rendering: {:.2}s", render_start.elapsed().as_secs_f64());
    Ok(result)
}

/// One line per edge: `from -- to  (label -- label)`.
pub fn format_edges(edges: &[Edge], delimiter: char) -> String {
    let mut out = String::new();
    for edge in edges {
        let _ = writeln!(
            out,
            "{} -- {}  ({} -- {})",
            edge.from,
            edge.to,
            resolve_label_with(&edge.from, delimiter),
            resolve_label_with(&edge.to, delimiter)
        );
    }
    out
}

/// Write to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).map_err(|err| {
                Error::from(err)
                    .with_operation("cli::output")
                    .with_context("path", path.display().to_string())
            })?;
            info!(path = %path.display(), "output written");
        }
        None => print!("{content}"),
    }
    Ok(())
}
