//! Genetic-algorithm route construction with 2-opt refinement.
//!
//! [`GeneticBuilder`] evolves permutations of the input stops. Each
//! permutation is decoded into routes by offering stops, in order, to the
//! vehicle whose closed tour grows the least ([`decode`]); every decoded
//! route is then shortened with [`two_opt`]. Fitness rewards delivered stops
//! first and penalises distance second ([`fitness`]).
//!
//! Randomness comes from a seeded `ChaCha8Rng`, so a given
//! [`GeneticConfig::seed`] reproduces the same run.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decode;
mod genetic;
mod operators;
mod two_opt;

pub use decode::{DELIVERY_REWARD, decode, fitness};
pub use genetic::{GeneticBuilder, GeneticConfig, GeneticRun};
pub use operators::{Chromosome, crossover, mutate, order_crossover};
pub use two_opt::two_opt;
