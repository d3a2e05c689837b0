//! Nearest-feasible-neighbour route construction.
//!
//! [`GreedyBuilder`] implements [`RouteBuilder`](courier_core::RouteBuilder)
//! by filling vehicles one at a time, always extending the current route with
//! the closest still-unassigned stop that the vehicle can admit. The result
//! is deterministic for a given input order, which makes it a useful baseline
//! and a cheap fallback when the genetic builder is not warranted.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod greedy;

pub use greedy::GreedyBuilder;
