//! Post-processing utilities for pulsar timing array analyses.
//!
//! * [`stats`] – frequency binning and the chain estimators (upper limits,
//!   Savage–Dickey Bayes factors, odds ratios, BIC).
//! * [`data`] – pulsar datasets, cadence / mask filtering and chain loading.
//! * [`postprocess`] – burned-in chain with trace and histogram grids.
//! * [`ui`], [`app`] – the egui viewer shell.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod postprocess;
pub mod state;
pub mod stats;
pub mod ui;

pub use error::{Error, Result};
