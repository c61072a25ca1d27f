//! Core types for graph rendering.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use meshview_core::ID_DELIMITER;

// Edges

/// Order independent identity of a peer link.
///
/// Holds both endpoint ids with `low <= high`, so `(a, b)` and `(b, a)`
/// produce equal keys. Kept as a pair rather than a joined string so ids
/// containing any separator can never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub low: String,
    pub high: String,
}

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.low == self.high
    }
}

/// A rendered peer link. Always oriented from the smaller id to the larger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl From<EdgeKey> for Edge {
    fn from(key: EdgeKey) -> Self {
        Self {
            from: key.low,
            to: key.high,
        }
    }
}

// Options

/// Handling of nodes that list themselves as a peer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SelfLoopPolicy {
    /// Silently discard self-loops.
    #[default]
    Drop,
    /// Emit a single node edge `{from: a, to: a}`.
    Keep,
    /// Fail with `ErrorKind::SelfLoop`.
    Reject,
}

/// Options shared by the canonicalizer and both builders.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub self_loops: SelfLoopPolicy,
    /// Separator used to derive short labels from ids.
    pub delimiter: char,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            self_loops: SelfLoopPolicy::default(),
            delimiter: ID_DELIMITER,
        }
    }
}

impl CollectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.self_loops = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

// View model

/// Visual role of a node; the interactive renderer maps it to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StyleClass {
    Local,
    Peer,
}

impl StyleClass {
    pub fn for_node(is_self: bool) -> Self {
        if is_self { Self::Local } else { Self::Peer }
    }
}

/// Node entry consumed by the interactive renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "styleClass")]
    pub style_class: StyleClass,
}

/// Everything the interactive renderer needs for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphViewModel {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<Edge>,
}
