//! ResourceMesh analytics engine.
//!
//! Stateless, synchronous components over already-fetched record
//! collections: demand scoring, allocation optimization, upgrade path
//! search, urgent matching, utilization trends, gap analysis and
//! collaboration graphs. Callers own all I/O and caching.

pub mod allocation;
pub mod collaboration;
pub mod config;
pub mod demand;
pub mod error;
pub mod gap;
pub mod records;
pub mod spec_match;
pub mod trends;
pub mod types;
pub mod union_find;
pub mod upgrade_path;
pub mod urgent_match;
