//! Operation builders for scholar-resolve.
//!
//! These builders provide a fluent, type-safe API for constructing
//! resolution requests. They validate inputs before a run starts.

mod resolve;

pub use resolve::{ResolveRequest, ResolveRequestBuilder};
