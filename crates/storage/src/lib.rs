//! scholar-storage: document storage for students and exam results.
//!
//! [`RecordStore`] is the seam between the services and a concrete backend.
//! [`MemoryStore`] is the bundled backend: documents in memory, optionally
//! mirrored to a JSON file. The [`conformance`] module holds a
//! backend-agnostic suite any implementation can run.

pub mod conformance;
mod error;
mod memory;
mod traits;

pub use error::{Collection, StorageError};
pub use memory::MemoryStore;
pub use traits::RecordStore;
