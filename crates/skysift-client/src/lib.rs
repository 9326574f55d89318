//! # skysift-client
//!
//! HTTP transport for Skysift:
//! - Search gateway over the index's `/feed` endpoint
//! - Batched post hydration via the AppView
//! - Language facet listing
//!
//! The traits are the seams the search pipeline depends on; tests swap in
//! in-memory implementations.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod facets;
pub mod gateway;
pub mod posts;

pub use client::SkysiftClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use facets::{LanguageFacets, LanguageSource};
pub use gateway::{FeedSkeleton, SearchGateway, SkeletonItem};
pub use posts::{GetPostsResponse, MAX_URIS_PER_CALL, PostFetcher};
