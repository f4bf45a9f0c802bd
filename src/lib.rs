//! ML-Monitor - live model health dashboard client
//!
//! Polls a metrics service for a model version's performance history and
//! per-feature drift scores, turns both feeds into chart-ready series, and
//! keeps them fresh while the version is being viewed.

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod polling;
pub mod transform;
pub mod upload;
