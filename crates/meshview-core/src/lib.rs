//! Snapshot model shared by every meshview builder.
//!
//! A [`Snapshot`] is one refresh worth of peer adjacency data. It is parsed
//! and validated here, then handed by reference to the builders in
//! `meshview-collect` and `meshview-dot`, which never mutate it.

pub mod label;
pub mod local;
pub mod snapshot;

pub use label::{ID_DELIMITER, resolve_label, resolve_label_with};
pub use local::{LocalNodePolicy, find_local_node};
pub use meshview_error::{Error, ErrorKind, Result};
pub use snapshot::{PeerNode, Snapshot};
