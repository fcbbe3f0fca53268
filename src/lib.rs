//! maimai DX NET Client Library
//!
//! This library signs in to the maimai DX NET player site, keeps the session
//! alive across calls, and turns its server-rendered pages into typed
//! records. On top of the single-page song lists it runs multi-criteria
//! score queries that intersect several filter dimensions.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`client`] - Connection façade, request pipeline, login handshake,
//!   maintenance guard and retry policy
//! - [`page`] - HTML extraction for each page kind
//! - [`query`] - Multi-criteria score query engine
//! - [`constants`] - Website constant tables (genres, versions, levels, ...)
//! - [`region`] - Per-region URLs and login rules
//! - [`config`] - Config file loading for the command-line client

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod constants;
pub mod model;
pub mod page;
pub mod query;
pub mod region;

#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use client::{
    ClientError, ClientOptions, Connection, ConnectionBuilder, Credentials, MaintenanceWindow,
    RetryPolicy, SystemClock, maintenance_period,
};
pub use config::{ConfigError, FileConfig, LoadedConfig};
pub use constants::{Dimension, FilterValue, ParameterError};
pub use model::{FinaleArchive, PlayerData, Record, ScoreList, TrackResult};
pub use query::{CustomQuery, FilterSelection};
pub use region::{Region, RegionConfig};
