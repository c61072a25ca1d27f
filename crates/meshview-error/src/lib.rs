//! # meshview-error
//!
//! Unified error handling for meshview.
//!
//! - **ErrorKind**: what went wrong (e.g. MalformedSnapshot, MissingLocalNode)
//! - **ErrorStatus**: whether a later refresh may succeed (Permanent, Temporary, Persistent)
//! - **Context**: key/value pairs naming the offending ids, urls or paths
//! - **Source**: the wrapped underlying error, if any
//!
//! ```rust
//! use meshview_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::MalformedSnapshot, "duplicate node id")
//!         .with_operation("core::snapshot")
//!         .with_context("id", "org-node7"))
//! }
//! ```
//!
//! Library code returns `meshview_error::Result<T>`, wraps foreign errors
//! with `set_source(err)` and only appends context when an error passes
//! through another layer.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using meshview Error
pub type Result<T> = std::result::Result<T, Error>;
