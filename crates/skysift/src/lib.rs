//! Skysift umbrella crate.
//!
//! Re-exports the Skysift components. The criteria model and the query
//! compiler are always available; the HTTP client, the search pipeline and
//! the CLI library sit behind feature flags.

#![doc = include_str!("../README.md")]

pub use skysift_core as core;
pub use skysift_query as query;

pub use skysift_core::{SearchCriteria, SortOrder, Timestamp, TriState};
pub use skysift_query::{CompiledRequest, compile};

#[cfg(feature = "client")]
pub use skysift_client as client;

#[cfg(feature = "search")]
pub use skysift_search as search;

#[cfg(feature = "cli")]
pub use skysift_cli as cli;
