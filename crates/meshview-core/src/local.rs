//! Locating the local participant in a snapshot.

use serde::Deserialize;
use strum_macros::{Display, EnumString, IntoStaticStr};
use tracing::warn;

use meshview_error::{Error, Result};

use crate::snapshot::{PeerNode, Snapshot};

/// What to do when the number of `self = true` nodes is not exactly one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LocalNodePolicy {
    /// Zero local nodes is `MissingLocalNode`, several is `AmbiguousLocalNode`.
    #[default]
    Strict,
    /// Zero local nodes is `MissingLocalNode`, several picks the first in
    /// snapshot order and logs the others.
    FirstMatch,
}

/// Find the single node marked `self = true` according to `policy`.
pub fn find_local_node(snapshot: &Snapshot, policy: LocalNodePolicy) -> Result<&PeerNode> {
    let mut locals = snapshot.iter().filter(|node| node.is_self);
    let first = locals
        .next()
        .ok_or_else(|| Error::missing_local_node().with_operation("core::find_local_node"))?;

    let rest: Vec<&PeerNode> = locals.collect();
    if rest.is_empty() {
        return Ok(first);
    }

    match policy {
        LocalNodePolicy::Strict => Err(Error::ambiguous_local_node(
            std::iter::once(first)
                .chain(rest)
                .map(|node| node.id.clone()),
        )
        .with_operation("core::find_local_node")),
        LocalNodePolicy::FirstMatch => {
            for other in &rest {
                warn!(chosen = %first.id, ignored = %other.id, "multiple local nodes in snapshot");
            }
            Ok(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_error::ErrorKind;

    fn snapshot(nodes: Vec<PeerNode>) -> Snapshot {
        Snapshot::new(nodes).unwrap()
    }

    #[test]
    fn test_single_local_node() {
        let snap = snapshot(vec![PeerNode::peer("b", ["a"]), PeerNode::local("a", ["b"])]);
        assert_eq!(find_local_node(&snap, LocalNodePolicy::Strict).unwrap().id, "a");
        assert_eq!(find_local_node(&snap, LocalNodePolicy::FirstMatch).unwrap().id, "a");
    }

    #[test]
    fn test_missing_local_node() {
        let snap = snapshot(vec![PeerNode::peer("b", ["a"])]);
        for policy in [LocalNodePolicy::Strict, LocalNodePolicy::FirstMatch] {
            let err = find_local_node(&snap, policy).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingLocalNode);
        }

        let err = find_local_node(&Snapshot::default(), LocalNodePolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingLocalNode);
    }

    #[test]
    fn test_ambiguous_local_node_strict() {
        let snap = snapshot(vec![
            PeerNode::local("a", ["b"]),
            PeerNode::peer("c", ["a"]),
            PeerNode::local("b", ["a"]),
        ]);
        let err = find_local_node(&snap, LocalNodePolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousLocalNode);
        assert_eq!(err.context_value("id"), Some("a"));
        assert_eq!(err.context().iter().filter(|(k, _)| *k == "id").count(), 2);
    }

    #[test]
    fn test_ambiguous_local_node_first_match() {
        let snap = snapshot(vec![PeerNode::local("a", ["b"]), PeerNode::local("b", ["a"])]);
        assert_eq!(find_local_node(&snap, LocalNodePolicy::FirstMatch).unwrap().id, "a");
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("first-match".parse::<LocalNodePolicy>().unwrap(), LocalNodePolicy::FirstMatch);
        assert_eq!(LocalNodePolicy::Strict.to_string(), "strict");
        assert!("first".parse::<LocalNodePolicy>().is_err());
    }
}
