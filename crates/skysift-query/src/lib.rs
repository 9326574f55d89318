//! Query compilation for Skysift.
//!
//! Turns a [`SearchCriteria`](skysift_core::SearchCriteria) into a
//! [`CompiledRequest`]: the query-language string plus the sort, limit,
//! author and date parameters the index expects.
//!
//! # Example
//!
//! ```rust
//! use skysift_core::SearchCriteria;
//! use skysift_query::compile;
//!
//! let criteria = SearchCriteria::new()
//!     .with_hashtag("coding")
//!     .with_hashtag("javascript");
//!
//! let request = compile(&criteria);
//! assert_eq!(request.query, "rkey:[* TO *] +tag:(coding javascript)");
//! assert_eq!(request.limit, 25);
//! ```

#![doc = include_str!("../README.md")]

pub mod compiler;
pub mod request;

mod proptests;

pub use compiler::{MATCH_ALL, compile, compile_in, compile_query};
pub use request::{CompiledRequest, PAGE_SIZE, SortKey};
