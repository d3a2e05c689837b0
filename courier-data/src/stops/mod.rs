//! Stop-list parsing.

use camino::{Utf8Path, Utf8PathBuf};
use courier_core::{DEFAULT_DEMAND, Stop, StopError, TimeWindow};
use log::warn;
use thiserror::Error;

/// Id given to the first stop that omits one; later ones count up.
pub const FIRST_GENERATED_ID: u64 = 1000;

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    /// The line had a field count no layout uses.
    #[error("expected 2, 3, 4 or 6 fields, found {0}")]
    UnsupportedArity(usize),
    /// A numeric field did not parse.
    #[error("{field} {value:?} is not a valid number")]
    InvalidNumber {
        /// Name of the field.
        field: &'static str,
        /// Raw field text.
        value: String,
    },
    /// The fields parsed but describe an invalid stop.
    #[error(transparent)]
    InvalidStop(#[from] StopError),
}

/// A skipped input line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// One-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub reason: LineError,
}

/// Stops read from an input together with the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedStops {
    /// Stops in input order.
    pub stops: Vec<Stop>,
    /// Skipped lines in input order.
    pub errors: Vec<ParseError>,
}

/// Failure to read a stop file at all.
#[derive(Debug, Error)]
pub enum LoadStopsError {
    /// The file could not be opened or read.
    #[error("failed to read stops from {path}")]
    Read {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
}

/// Parse a stop list.
///
/// # Examples
/// ```
/// use courier_data::parse_stops;
///
/// let parsed = parse_stops("# depot at origin\n3,4\nb,1,1,2\nc,oops,1\n");
/// let ids: Vec<_> = parsed.stops.iter().map(|stop| stop.id.as_str()).collect();
/// assert_eq!(ids, ["1000", "b"]);
/// assert_eq!(parsed.errors.len(), 1);
/// assert_eq!(parsed.errors[0].line, 4);
/// ```
#[must_use]
pub fn parse_stops(input: &str) -> ParsedStops {
    let mut parsed = ParsedStops::default();
    let mut next_id = FIRST_GENERATED_ID;

    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        match parse_line(line, next_id) {
            Ok((stop, generated)) => {
                if generated {
                    next_id += 1;
                }
                parsed.stops.push(stop);
            }
            Err(reason) => {
                let error = ParseError {
                    line: index + 1,
                    reason,
                };
                warn!("skipping invalid stop {error}: {line}");
                parsed.errors.push(error);
            }
        }
    }
    parsed
}

/// Read and parse a stop file.
///
/// # Errors
/// Returns [`LoadStopsError::Read`] when the file cannot be read. Bad lines
/// are reported in [`ParsedStops::errors`] instead.
pub fn load_stops(path: &Utf8Path) -> Result<ParsedStops, LoadStopsError> {
    let contents = courier_fs::read_utf8_file(path).map_err(|source| LoadStopsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_stops(&contents);
    log::info!(
        "loaded {} stops from {path} ({} lines skipped)",
        parsed.stops.len(),
        parsed.errors.len()
    );
    Ok(parsed)
}

/// Parse one non-comment line; the flag says whether `generated_id` was used.
fn parse_line(line: &str, generated_id: u64) -> Result<(Stop, bool), LineError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    match fields.as_slice() {
        [x, y] => {
            let stop = Stop::new(generated_id.to_string(), number("x", x)?, number("y", y)?);
            stop.validate()?;
            Ok((stop, true))
        }
        [id, x, y] => build(id, x, y, None, None).map(|stop| (stop, false)),
        [id, x, y, demand] => build(id, x, y, Some(*demand), None).map(|stop| (stop, false)),
        [id, x, y, demand, start, end] => {
            build(id, x, y, Some(*demand), Some((*start, *end))).map(|stop| (stop, false))
        }
        other => Err(LineError::UnsupportedArity(other.len())),
    }
}

fn build(
    id: &str,
    x: &str,
    y: &str,
    raw_demand: Option<&str>,
    raw_window: Option<(&str, &str)>,
) -> Result<Stop, LineError> {
    let demand = match raw_demand {
        Some(raw) => raw.parse::<u32>().map_err(|_| LineError::InvalidNumber {
            field: "demand",
            value: raw.to_owned(),
        })?,
        None => DEFAULT_DEMAND,
    };
    let window = match raw_window {
        Some((start, end)) => TimeWindow::new(number("start", start)?, number("end", end)?)?,
        None => TimeWindow::UNBOUNDED,
    };
    Ok(Stop::try_new(
        id,
        number("x", x)?,
        number("y", y)?,
        demand,
        window,
    )?)
}

fn number(field: &'static str, raw: &str) -> Result<f64, LineError> {
    raw.parse::<f64>().map_err(|_| LineError::InvalidNumber {
        field,
        value: raw.to_owned(),
    })
}
