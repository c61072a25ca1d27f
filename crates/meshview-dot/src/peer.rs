//! Peer network rendering for the static graph view.

use tracing::{debug, warn};

use meshview_collect::{canonicalize, label_collisions};
use meshview_core::{Result, Snapshot, find_local_node, resolve_label_with};

use crate::RenderOptions;
use crate::dot::DotBuilder;

/// Marker appended under the local node's label.
pub const LOCAL_MARKER: &str = "(local)";

/// Render `snapshot` as a DOT digraph with undirected looking edges.
///
/// Nodes are named by their short label, so distinct ids sharing a label
/// merge into one DOT node. Such collisions are logged, not rewritten.
pub fn render_peer_graph(snapshot: &Snapshot, options: &RenderOptions) -> Result<String> {
    let delimiter = options.collect.delimiter;
    let local = find_local_node(snapshot, options.local_node)
        .map_err(|err| err.with_operation("dot::render_peer_graph"))?;
    let edges = canonicalize(snapshot, &options.collect)
        .map_err(|err| err.with_operation("dot::render_peer_graph"))?;

    for (label, ids) in label_collisions(snapshot, delimiter) {
        warn!(%label, ids = ?ids, "distinct peers share a label and merge in the graph");
    }

    let mut dot = DotBuilder::new("peers");
    dot.edge_defaults(&[("arrowhead", "none")]).blank();

    let local_label = local.label_with(delimiter);
    let annotated = format!("{local_label}\n{LOCAL_MARKER}");
    dot.node(local_label, &[("label", annotated.as_str())]);

    if !edges.is_empty() {
        dot.blank();
    }
    for edge in &edges {
        dot.edge(
            resolve_label_with(&edge.from, delimiter),
            resolve_label_with(&edge.to, delimiter),
        );
    }

    debug!(local = %local.id, edges = edges.len(), "rendered peer graph");
    Ok(dot.build())
}
