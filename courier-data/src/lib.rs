//! Stop-list input for the courier engine.
//!
//! The input is line-oriented text with one stop per line and
//! comma-separated fields:
//!
//! | Fields                          | Meaning                                  |
//! |---------------------------------|------------------------------------------|
//! | `x,y`                           | generated id, demand 1, no window        |
//! | `id,x,y`                        | demand 1, no window                      |
//! | `id,x,y,demand`                 | no window                                |
//! | `id,x,y,demand,start,end`       | fully specified                          |
//!
//! Blank lines and lines starting with `#` or `//` are ignored. A line that
//! does not parse is skipped with a warning and reported as a
//! [`ParseError`]; it never aborts the load.
#![forbid(unsafe_code)]

mod stops;

pub use stops::{
    FIRST_GENERATED_ID, LineError, LoadStopsError, ParseError, ParsedStops, load_stops,
    parse_stops,
};
