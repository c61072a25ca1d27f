//! Node and edge collection for peer graph rendering.
//!
//! This crate turns a [`meshview_core::Snapshot`] into format agnostic
//! edges and node entries that the renderers consume: the JSON view model
//! for the interactive view here, DOT text in `meshview-dot`.
//!
//! # Module Structure
//!
//! - [`types`]: Core types (Edge, EdgeKey, GraphViewModel, CollectOptions, etc.)
//! - [`collect`]: Edge canonicalization and view model assembly

mod collect;
mod types;

pub use collect::{build_view_model, canonicalize, label_collisions};
pub use types::{
    CollectOptions, Edge, EdgeKey, GraphViewModel, SelfLoopPolicy, StyleClass, ViewNode,
};
