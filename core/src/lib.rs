#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Streaming estimation of Fst between two populations.
//!
//! This serves as the core library implementation for the `filtfst` CLI, but can also be used as
//! a free-standing library for computing Fst from `ms`-style variant matrices.
//!
//! # Overview
//!
//! Records are read from a stream by a [`record::Reader`], which owns a growable [`Matrix`] of
//! genotypes. Each matrix is then reduced to a single [`Fst`] value using the estimator of
//! Hudson, Slatkin and Maddison (1992), treating the first `n1` rows as population 1 and the
//! following `n2` rows as population 2.
//!
//! # Example
//!
//! ```
//! use fst_core::{
//!     record::{self, ReadStatus},
//!     Fst, MinSampleSize, Populations,
//! };
//!
//! // One record with a single site, four samples in each population
//! let src = "1\n0.5\n1\n1\n0\n0\n0\n0\n0\n0\n";
//!
//! let populations = Populations::new(4, 4);
//! let min_sample_size = MinSampleSize::default();
//!
//! let mut reader = record::Builder::default()
//!     .set_populations(Some(populations))
//!     .set_min_sample_size(min_sample_size)
//!     .build_from_reader(src.as_bytes())
//!     .expect("valid framing");
//!
//! let ReadStatus::Read(matrix) = reader.read_record() else {
//!     panic!("expected a record");
//! };
//! let fst = Fst::from_matrix(matrix, populations, min_sample_size).expect("matching samples");
//!
//! assert_eq!(fst.to_string(), "0.333333");
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod fst;
pub use fst::Fst;

pub mod input;
pub use input::Input;

pub mod matrix;
pub use matrix::Matrix;

pub mod population;
pub use population::{MinSampleSize, Populations};

pub mod record;
