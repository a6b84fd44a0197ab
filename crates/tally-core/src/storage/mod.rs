//! Local persistence for the entry mirror
//!
//! The mirror is a single JSON file holding the whole collection,
//! replaced wholesale on every write. There is no merging and no
//! per-entry update path.

mod error;
mod local;

pub use error::StorageError;
pub use local::LocalStore;
