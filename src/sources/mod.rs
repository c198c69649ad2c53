//! Source adapters consumed by the resolver.
//!
//! The traits describe the collaborators; the in-memory module provides
//! reference implementations.

mod memory;
mod session;
mod traits;

pub use memory::{InMemoryBulkDataset, InMemoryFetcher, InMemoryRegistry};
pub use session::{FetchSession, Throttle};
pub use traits::{BulkDatasetSource, LiveProfileFetcher, RawDocument, RemoteRegistryClient};
