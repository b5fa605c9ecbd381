//! # gymshot-cli
//!
//! Command-line interface for the gymshot screenshot pipeline.
//!
//! ## Commands
//!
//! - `gymshot run`: Process the pending directory until it is empty
//! - `gymshot once`: Process a single batch
//! - `gymshot translate`: Translate saved model output without any network calls
//! - `gymshot config`: Show the effective configuration
//! - `gymshot init`: Write a default gymshot.toml

pub mod commands;

pub use commands::Cli;
