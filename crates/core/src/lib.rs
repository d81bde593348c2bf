//! Core library for uniformly sampled series and their ordered containers.
//!
//! The crate models instrument measurements and their time-frequency
//! transforms as four containers built on one another: a uniformly sampled
//! [`Series`], a [`TimeSeries`] anchored at an absolute start time, a
//! key-ordered [`MultiSeries`] of rows sharing one spacing, and a
//! [`TimeFreqSpectrum`] whose rows are time series keyed by frequency. The
//! resampling kernel is an external collaborator behind the [`Resampler`]
//! trait; computing spectral content is out of scope, only storing, merging,
//! and retrieving rows is handled here.
//!
//! Everything is synchronous and single-writer: appends locate an insertion
//! point and then mutate, with no internal locking.

pub mod error;
pub mod multiseries;
pub mod resample;
pub mod series;
pub mod spectrum;
pub mod timeseries;

pub use error::{Result, TimeFreqError};
pub use multiseries::{MultiSeries, Rows};
pub use num_complex::Complex64;
pub use resample::Resampler;
pub use series::{Selection, Series, SliceSpec};
pub use spectrum::{EpochSpec, SpectrumRows, TimeFreqSpectrum};
pub use timeseries::TimeSeries;
