//! # Berth CLI
//!
//! Support code for the `berth` command-line tool: configuration loading,
//! the PING/PONG echo server, and the pool exercise driver.

pub mod config;
pub mod echo;
pub mod exercise;

pub use config::{BerthConfig, ConfigError, ExerciseConfig, ServerConfig};
pub use exercise::ExerciseReport;
