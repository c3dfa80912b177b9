//! Library exports for reuse in the CLI, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// TOML configuration for panel runs.
pub mod config;
/// Dataset catalog, loading, splitting and scaling.
pub mod dataset;
/// Error types shared across pipeline stages.
pub mod error;
/// Tracing subscriber setup and log file management.
pub mod logging;
/// Classifiers and classification metrics.
pub mod ml;
/// Procedure panel and its threaded runner.
pub mod panel;
/// Load, prepare, run and rank in one call.
pub mod pipeline;
/// Ranked report and text rendering.
pub mod report;
/// Hypothesis tests, intervals and regression.
pub mod stats;

pub use error::{FitError, PipelineError};
pub use pipeline::{PipelineOutput, run, run_dataset};
