//! # Estadísticas
//! src/metrics/mod.rs
//!
//! - `stats`: contador y latencia media de los jobs de hashing
//! - `handlers`: endpoint `/stats`

pub mod handlers;
pub mod stats;

pub use stats::{StatsAggregator, StatsSnapshot};
