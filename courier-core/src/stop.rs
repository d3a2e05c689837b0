//! Delivery stops and their service windows.

use std::fmt;

use geo::Coord;
use thiserror::Error;

/// Demand assigned to a stop when the input omits one.
pub const DEFAULT_DEMAND: u32 = 1;

/// Interval within which service at a stop must begin.
///
/// The end may be `f64::INFINITY` for an unrestricted window.
///
/// # Examples
/// ```
/// use courier_core::TimeWindow;
///
/// let window = TimeWindow::new(5.0, 10.0)?;
/// assert_eq!(window.service_start(2.0), 5.0);
/// assert!(window.admits(9.5));
/// assert!(!window.admits(10.5));
/// # Ok::<(), courier_core::StopError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    /// Earliest service start.
    pub start: f64,
    /// Latest service start; `f64::INFINITY` when unrestricted.
    #[cfg_attr(feature = "serde", serde(with = "unbounded_end", default = "unbounded"))]
    pub end: f64,
}

#[cfg(feature = "serde")]
const fn unbounded() -> f64 {
    f64::INFINITY
}

impl TimeWindow {
    /// Window admitting any arrival time.
    pub const UNBOUNDED: Self = Self {
        start: 0.0,
        end: f64::INFINITY,
    };

    /// Validate and construct a window.
    pub fn new(start: f64, end: f64) -> Result<Self, StopError> {
        if start.is_nan() || end.is_nan() || start.is_infinite() {
            return Err(StopError::InvalidWindow { start, end });
        }
        if start > end {
            return Err(StopError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether the window restricts service at all.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.end.is_finite() || self.start > 0.0
    }

    /// Time service begins for a vehicle arriving at `arrival`.
    #[must_use]
    pub fn service_start(&self, arrival: f64) -> f64 {
        arrival.max(self.start)
    }

    /// Whether service can begin in time for a vehicle arriving at `arrival`.
    #[must_use]
    pub fn admits(&self, arrival: f64) -> bool {
        self.service_start(arrival) <= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// A delivery request at a fixed location.
///
/// Stops are identified by `id`; two stops sharing an id are treated as
/// the same stop.
///
/// # Examples
/// ```
/// use courier_core::{Stop, TimeWindow};
///
/// let stop = Stop::new("a", 3.0, 4.0).with_demand(2);
/// assert_eq!(stop.demand, 2);
/// assert_eq!(stop.window, TimeWindow::UNBOUNDED);
/// assert_eq!(stop.to_string(), "a(3.0, 4.0, d=2, TW=[0,inf])");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Unique identifier.
    pub id: String,
    /// Position in the plane; the depot sits at the origin.
    pub location: Coord<f64>,
    /// Units of vehicle capacity consumed by the delivery.
    #[cfg_attr(feature = "serde", serde(default = "default_demand"))]
    pub demand: u32,
    /// Service window.
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: TimeWindow,
}

#[cfg(feature = "serde")]
const fn default_demand() -> u32 {
    DEFAULT_DEMAND
}

/// Errors returned when validating a [`Stop`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StopError {
    /// The identifier was blank.
    #[error("stop id must not be empty")]
    EmptyId,
    /// A coordinate was NaN or infinite.
    #[error("stop {id} has a non-finite coordinate")]
    NonFiniteLocation {
        /// Offending stop.
        id: String,
    },
    /// Demand must be at least one unit.
    #[error("stop {id} must have a demand of at least 1")]
    ZeroDemand {
        /// Offending stop.
        id: String,
    },
    /// The window was empty or not a number.
    #[error("time window [{start}, {end}] is invalid")]
    InvalidWindow {
        /// Window start.
        start: f64,
        /// Window end.
        end: f64,
    },
}

impl Stop {
    /// Construct a stop with unit demand and an unrestricted window.
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            location: Coord { x, y },
            demand: DEFAULT_DEMAND,
            window: TimeWindow::UNBOUNDED,
        }
    }

    /// Validate and construct a fully specified stop.
    ///
    /// # Examples
    /// ```
    /// use courier_core::{Stop, StopError, TimeWindow};
    ///
    /// let err = Stop::try_new("a", 1.0, 1.0, 0, TimeWindow::UNBOUNDED).unwrap_err();
    /// assert!(matches!(err, StopError::ZeroDemand { .. }));
    /// ```
    pub fn try_new(
        id: impl Into<String>,
        x: f64,
        y: f64,
        demand: u32,
        window: TimeWindow,
    ) -> Result<Self, StopError> {
        let stop = Self::new(id, x, y).with_demand(demand).with_window(window);
        stop.validate()?;
        Ok(stop)
    }

    /// Replace the demand.
    #[must_use]
    pub const fn with_demand(mut self, demand: u32) -> Self {
        self.demand = demand;
        self
    }

    /// Replace the service window.
    #[must_use]
    pub const fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Check the invariants a builder relies on.
    pub fn validate(&self) -> Result<(), StopError> {
        if self.id.trim().is_empty() {
            return Err(StopError::EmptyId);
        }
        if !self.location.x.is_finite() || !self.location.y.is_finite() {
            return Err(StopError::NonFiniteLocation {
                id: self.id.clone(),
            });
        }
        if self.demand == 0 {
            return Err(StopError::ZeroDemand {
                id: self.id.clone(),
            });
        }
        TimeWindow::new(self.window.start, self.window.end).map(|_| ())
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:.1}, {:.1}, d={}, TW=[{},{}])",
            self.id,
            self.location.x,
            self.location.y,
            self.demand,
            self.window.start,
            if self.window.end.is_finite() {
                self.window.end.to_string()
            } else {
                "inf".to_owned()
            }
        )
    }
}

/// Serialise an unbounded window end as `null`.
#[cfg(feature = "serde")]
mod unbounded_end {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(end: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if end.is_finite() {
            serializer.serialize_some(end)
        } else {
            serializer.serialize_none()
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
