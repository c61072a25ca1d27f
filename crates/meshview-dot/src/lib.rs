//! Graph rendering module for producing DOT format output.
//!
//! This module transforms a peer graph [`Snapshot`] into the DOT text
//! consumed by the static renderer.
//!
//! # Module Structure
//!
//! - [`dot`]: DOT format utilities and the [`DotBuilder`] writer
//! - [`peer`]: peer network rendering

mod dot;
mod peer;

use meshview_core::{LocalNodePolicy, Result, Snapshot};

pub use dot::{DotBuilder, escape_label, quote_id};
pub use meshview_collect::{CollectOptions, SelfLoopPolicy};
pub use peer::{LOCAL_MARKER, render_peer_graph};

// ============================================================================
// Options
// ============================================================================

/// Options for peer graph rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Edge canonicalization and labelling.
    pub collect: CollectOptions,
    /// How to treat snapshots without exactly one local node.
    pub local_node: LocalNodePolicy,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collect(mut self, collect: CollectOptions) -> Self {
        self.collect = collect;
        self
    }

    pub fn with_local_node(mut self, policy: LocalNodePolicy) -> Self {
        self.local_node = policy;
        self
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Render with default options: strict local node, self-loops dropped,
/// `-` separated ids.
pub fn render_graph(snapshot: &Snapshot) -> Result<String> {
    render_peer_graph(snapshot, &RenderOptions::default())
}
