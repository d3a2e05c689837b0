//! Helpers shared by the subcommand configurations.

use std::io::Write;

use camino::Utf8Path;
use courier_engine::{FleetRegistry, Stop};

use crate::CliError;

/// Uniform fleet described by the `--vehicles`, `--capacity` and
/// `--max-distance` options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FleetSettings {
    pub(crate) vehicles: usize,
    pub(crate) capacity: u32,
    pub(crate) max_distance: f64,
}

impl FleetSettings {
    pub(crate) fn registry(&self) -> Result<FleetRegistry, CliError> {
        Ok(FleetRegistry::uniform(
            self.vehicles,
            self.capacity,
            self.max_distance,
        )?)
    }
}

/// Unwrap a merged option, naming the flag and variable when it is absent.
pub(crate) fn required<T>(
    value: Option<T>,
    field: &'static str,
    env: &'static str,
) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match courier_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the stop file, reporting skipped lines on `diagnostics`.
pub(crate) fn load_stops(
    path: &Utf8Path,
    diagnostics: &mut dyn Write,
) -> Result<Vec<Stop>, CliError> {
    let parsed = courier_data::load_stops(path)?;
    for error in &parsed.errors {
        writeln!(diagnostics, "skipped {path} {error}").map_err(CliError::WriteOutput)?;
    }
    Ok(parsed.stops)
}
