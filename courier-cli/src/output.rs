//! Rendering of optimisation results.

use std::io::Write;

use courier_engine::OptimizationSummary;

use crate::CliError;

/// Write `summary` as pretty JSON followed by its status line.
pub(crate) fn write_summary(
    writer: &mut dyn Write,
    summary: &OptimizationSummary,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(summary).map_err(CliError::SerialiseSummary)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteOutput)?;
    writeln!(writer, "{}", summary.status_line()).map_err(CliError::WriteOutput)?;
    Ok(())
}
