//! Peer adjacency snapshots as returned by the explorer backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use meshview_error::{Error, Result};

use crate::label::resolve_label_with;

/// One network participant in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNode {
    /// Hierarchical id, e.g. `org-cluster-eu-node7`.
    pub id: String,
    /// Adjacency list, in backend order.
    pub peers: Vec<String>,
    /// True for the node the backend itself runs as.
    #[serde(rename = "self", default)]
    pub is_self: bool,
}

impl PeerNode {
    pub fn new<I, S>(id: impl Into<String>, peers: I, is_self: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            peers: peers.into_iter().map(Into::into).collect(),
            is_self,
        }
    }

    /// A node representing the local participant.
    pub fn local<I, S>(id: impl Into<String>, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, peers, true)
    }

    /// A remote peer.
    pub fn peer<I, S>(id: impl Into<String>, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, peers, false)
    }

    /// Short label of this node's id, see [`resolve_label_with`].
    pub fn label_with(&self, delimiter: char) -> &str {
        resolve_label_with(&self.id, delimiter)
    }
}

/// A validated list of peer nodes with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    nodes: Vec<PeerNode>,
}

impl Snapshot {
    /// Wrap `nodes`, rejecting duplicate ids.
    pub fn new(nodes: Vec<PeerNode>) -> Result<Self> {
        {
            let mut seen = HashSet::with_capacity(nodes.len());
            for node in &nodes {
                if !seen.insert(node.id.as_str()) {
                    return Err(Error::malformed_snapshot(format!(
                        "duplicate node id '{}'",
                        node.id
                    ))
                    .with_operation("core::snapshot")
                    .with_context("id", node.id.clone()));
                }
            }
        }
        Ok(Self { nodes })
    }

    /// Parse the JSON array served by the peer graph endpoint.
    pub fn from_json(text: &str) -> Result<Self> {
        let nodes: Vec<PeerNode> = serde_json::from_str(text).map_err(malformed)?;
        debug!(nodes = nodes.len(), "parsed peer graph snapshot");
        Self::new(nodes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let nodes: Vec<PeerNode> = serde_json::from_slice(bytes).map_err(malformed)?;
        debug!(nodes = nodes.len(), "parsed peer graph snapshot");
        Self::new(nodes)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeerNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of adjacency entries across all nodes.
    pub fn directed_entries(&self) -> usize {
        self.nodes.iter().map(|node| node.peers.len()).sum()
    }

}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a PeerNode;
    type IntoIter = std::slice::Iter<'a, PeerNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

fn malformed(err: serde_json::Error) -> Error {
    Error::malformed_snapshot(err.to_string())
        .with_operation("core::snapshot")
        .with_context("line", err.line().to_string())
        .with_context("column", err.column().to_string())
        .set_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_backend_shape() {
        let snapshot = Snapshot::from_json(
            r#"[
                {"id": "A-node1", "peers": ["B-node2"], "self": true},
                {"id": "B-node2", "peers": ["A-node1"], "self": false}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            snapshot.iter().cloned().collect::<Vec<_>>(),
            vec![
                PeerNode::local("A-node1", ["B-node2"]),
                PeerNode::peer("B-node2", ["A-node1"]),
            ]
        );
        assert_eq!(snapshot.directed_entries(), 2);
        let labels: Vec<&str> = snapshot.iter().map(|node| node.label_with('-')).collect();
        assert_eq!(labels, ["node1", "node2"]);
    }

    #[test]
    fn test_self_defaults_to_false() {
        let snapshot = Snapshot::from_json(r#"[{"id": "x", "peers": []}]"#).unwrap();
        assert!(!snapshot.iter().next().unwrap().is_self);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let snapshot =
            Snapshot::from_json(r#"[{"id": "x", "peers": [], "self": true, "addr": "1.2.3.4"}]"#)
                .unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let err = Snapshot::from_json(r#"[{"peers": []}]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSnapshot);
        assert!(err.message().contains("id"));
        assert!(err.source_ref().is_some());
    }

    #[test]
    fn test_non_array_peers_is_malformed() {
        for text in [
            r#"[{"id": "x", "peers": "y"}]"#,
            r#"[{"id": "x", "peers": null}]"#,
            r#"[{"id": "x"}]"#,
        ] {
            let err = Snapshot::from_json(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedSnapshot, "input {text}");
        }
    }

    #[test]
    fn test_non_array_root_is_malformed() {
        let err = Snapshot::from_slice(br#"{"id": "x", "peers": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSnapshot);
        assert_eq!(err.operation(), "core::snapshot");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Snapshot::new(vec![
            PeerNode::local("a", ["b"]),
            PeerNode::peer("b", ["a"]),
            PeerNode::peer("a", Vec::<String>::new()),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSnapshot);
        assert_eq!(err.context_value("id"), Some("a"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::from_json("[]").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.directed_entries(), 0);
    }

    #[test]
    fn test_serializes_back_to_backend_shape() {
        let snapshot = Snapshot::new(vec![PeerNode::local("a-1", ["b-2"])]).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"[{"id":"a-1","peers":["b-2"],"self":true}]"#);
    }
}
