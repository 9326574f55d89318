//! Skysift Core: shared types, criteria model, and errors.
//!
//! This crate provides the foundational types used across all Skysift crates.
//! It has no internal Skysift dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`criteria`]: The structured search criteria model
//! - [`post`]: Post references and hydrated post records
//! - [`error`]: Error types and Result alias

#![doc = include_str!("../README.md")]

pub mod criteria;
pub mod error;
pub mod post;

mod proptests;

// Re-export key types at crate root for convenience
pub use criteria::{EmbedKind, KNOWN_LABELS, SearchCriteria, SortOrder, Timestamp, TriState};
pub use error::{Error, Result, TransportError, TransportStatus};
pub use post::{Author, PostBody, PostRecord, PostReference};
