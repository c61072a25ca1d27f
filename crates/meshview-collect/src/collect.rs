//! Edge and node collection from a peer graph snapshot.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use meshview_core::{Error, Result, Snapshot, resolve_label_with};

use crate::types::{
    CollectOptions, Edge, EdgeKey, GraphViewModel, SelfLoopPolicy, StyleClass, ViewNode,
};

/// Collapse the bidirectional adjacency listing into one edge per unordered pair.
///
/// Edges are oriented from the lexicographically smaller id to the larger
/// and returned sorted by that pair, so the result depends only on the set
/// of links in the snapshot, never on node or adjacency order. A symmetric
/// listing with `E` entries yields exactly `E / 2` edges.
///
/// Peers missing from the snapshot still produce edges.
pub fn canonicalize(snapshot: &Snapshot, options: &CollectOptions) -> Result<Vec<Edge>> {
    let mut edges: BTreeMap<EdgeKey, Edge> = BTreeMap::new();

    for node in snapshot {
        for peer in &node.peers {
            let key = EdgeKey::new(&node.id, peer);

            if key.is_self_loop() {
                match options.self_loops {
                    SelfLoopPolicy::Drop => {
                        debug!(id = %node.id, "dropping self-loop");
                        continue;
                    }
                    SelfLoopPolicy::Keep => {}
                    SelfLoopPolicy::Reject => {
                        return Err(Error::self_loop(node.id.clone())
                            .with_operation("collect::canonicalize"));
                    }
                }
            }

            edges
                .entry(key)
                .or_insert_with_key(|key| Edge::from(key.clone()));
        }
    }

    debug!(
        entries = snapshot.directed_entries(),
        edges = edges.len(),
        "canonicalized peer links"
    );

    Ok(edges.into_values().collect())
}

/// Build the node/edge dataset for the interactive renderer.
///
/// Nodes keep snapshot order.
pub fn build_view_model(snapshot: &Snapshot, options: &CollectOptions) -> Result<GraphViewModel> {
    let nodes = snapshot
        .iter()
        .map(|node| ViewNode {
            id: node.id.clone(),
            label: node.label_with(options.delimiter).to_string(),
            style_class: StyleClass::for_node(node.is_self),
        })
        .collect();

    let edges = canonicalize(snapshot, options)?;

    Ok(GraphViewModel { nodes, edges })
}

/// Group distinct ids that resolve to the same short label.
///
/// Only labels shared by two or more ids are returned. Ids that appear
/// solely in adjacency lists are included, since they become DOT nodes too.
pub fn label_collisions(snapshot: &Snapshot, delimiter: char) -> BTreeMap<String, Vec<String>> {
    let mut by_label: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    let ids = snapshot
        .iter()
        .flat_map(|node| std::iter::once(&node.id).chain(node.peers.iter()));
    for id in ids {
        by_label
            .entry(resolve_label_with(id, delimiter))
            .or_default()
            .insert(id.as_str());
    }

    by_label
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(label, ids)| {
            (
                label.to_string(),
                ids.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}
