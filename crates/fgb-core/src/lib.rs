//! Core domain + application logic for the Fshare link bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the Fshare
//! REST API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod pipeline;
pub mod resolver;
pub mod security;

pub use errors::{Error, ResolutionError, Result};
