//! Search pipeline for Skysift.
//!
//! Takes compiled requests through the two-stage fetch: the index returns
//! ranked post references, the hydration cache turns them into full posts,
//! and the assembler merges the two back into rank order.
//!
//! # Modules
//!
//! - [`cache`]: structurally keyed, de-duplicating hydration cache
//! - [`assemble`]: rank-order merge and the two empty states
//! - [`store`]: single-writer criteria state with watch subscribers
//! - [`pipeline`]: search → hydrate → assemble with last-request-wins
//! - [`error`]: stage-tagged pipeline errors

#![doc = include_str!("../README.md")]

pub mod assemble;
pub mod cache;
pub mod error;
pub mod pipeline;
pub mod store;

mod proptests;

pub use assemble::{EmptyReason, ResultSet, assemble};
pub use cache::{DEFAULT_CAPACITY, HydrationCache, PostMap, UriSet};
pub use error::{PipelineError, Stage};
pub use pipeline::{Phase, RunOutcome, SearchPipeline, SearchState};
pub use store::{CriteriaStore, Update};
