//! Error types emitted by the courier CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use courier_data::LoadStopsError;
use courier_engine::negotiation::NegotiationError;
use courier_engine::{BuildError, FleetError, UnknownStrategy};
use thiserror::Error;

/// Errors emitted by the courier CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that also sets it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The strategy name was not recognised.
    #[error(transparent)]
    InvalidStrategy(#[from] UnknownStrategy),
    /// The fleet settings do not describe valid vehicles.
    #[error("invalid fleet: {0}")]
    InvalidFleet(#[from] FleetError),
    /// The stop file could not be read.
    #[error(transparent)]
    LoadStops(#[from] LoadStopsError),
    /// The route builder rejected the stops.
    #[error("route construction failed: {0}")]
    Build(#[from] BuildError),
    /// Negotiation could not run.
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),
    /// The async runtime for negotiation could not start.
    #[error("failed to start the negotiation runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serialising the summary failed.
    #[error("failed to serialise the optimisation summary: {0}")]
    SerialiseSummary(#[source] serde_json::Error),
    /// Writing output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
