//! # skysift-cli
//!
//! Command-line client for a Skysift search index:
//! - `search`: compile filters, search, hydrate, and print posts
//! - `query`: print the compiled request without sending it
//! - `langs`: list the languages the index has seen
//! - `config`: locate, create, read, and edit the config file

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod render;

pub use cli::{Cli, Command, ConfigAction, SearchArgs};
pub use config::SkysiftConfig;
pub use error::{Error, Result};
