//! Normalises loosely-structured bookmaker odds feeds into canonical per-market snapshots and
//! prices them against predicted probabilities. A bookmaker price that beats the fair price implied
//! by a prediction is a _value bet_.
//!
//! The library is pure: every extractor and converter is a deterministic function of its inputs.

pub mod extract;
pub mod feed;
pub mod market;
pub mod prediction;
pub mod price;
pub mod print;
pub mod snapshot;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
