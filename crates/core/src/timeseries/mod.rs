use std::fmt;
use std::ops::{Index, IndexMut};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{Resampler, Result, Series, TimeFreqError};

/// Relative tolerance when checking that a spacing inverts to a whole rate.
const RATE_TOLERANCE: f64 = 1e-9;

/// A uniformly sampled sequence anchored at an absolute start time.
///
/// The spacing is always the reciprocal of an integer sample rate, so the
/// rate round-trips exactly through [`TimeSeries::fs`]. Everything else
/// behaves like the underlying [`Series`]: fixed length, element-wise
/// mutation only, transformations return new instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    series: Series,
    epoch: f64,
}

impl TimeSeries {
    /// Creates a time series from complex samples, a start time, and an
    /// integer sample rate.
    pub fn new(values: Vec<Complex64>, epoch: f64, fs: u32) -> Result<Self> {
        Self::with_info(values, epoch, fs, "TimeSeries")
    }

    /// Creates a time series with an explicit diagnostic label.
    pub fn with_info(
        values: Vec<Complex64>,
        epoch: f64,
        fs: u32,
        info: impl Into<String>,
    ) -> Result<Self> {
        let deltax = rate_to_spacing(fs)?;
        let series = Series::with_info(values, deltax, info)?;
        Self::anchor(series, epoch)
    }

    /// Creates a time series from real samples, widening them to complex.
    pub fn from_real(values: &[f64], epoch: f64, fs: u32) -> Result<Self> {
        Self::new(
            values.iter().map(|&v| Complex64::new(v, 0.0)).collect(),
            epoch,
            fs,
        )
    }

    /// Anchors an existing series at a start time. The series' spacing must
    /// invert to a whole sample rate.
    pub fn from_series(series: Series, epoch: f64) -> Result<Self> {
        let rate = 1.0 / series.deltax();
        if rate < 1.0 - RATE_TOLERANCE || (rate - rate.round()).abs() > RATE_TOLERANCE * rate {
            return Err(TimeFreqError::InvalidScalar(format!(
                "spacing {} does not invert to a whole sample rate",
                series.deltax()
            )));
        }
        Self::anchor(series, epoch)
    }

    fn anchor(series: Series, epoch: f64) -> Result<Self> {
        if !epoch.is_finite() {
            return Err(TimeFreqError::InvalidScalar(format!(
                "epoch must be a finite scalar, got {epoch}"
            )));
        }
        Ok(Self { series, epoch })
    }

    /// Skips validation for rows rebuilt out of a container that already
    /// guarantees the invariants.
    pub(crate) fn from_parts(series: Series, epoch: f64) -> Self {
        Self { series, epoch }
    }

    /// Integer sample rate, recovered from the spacing.
    pub fn fs(&self) -> u32 {
        (1.0 / self.series.deltax()).round() as u32
    }

    /// Absolute start time.
    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Absolute time of every sample, `epoch + x_axis`. Recomputed on each
    /// call from the current state.
    pub fn times(&self) -> Vec<f64> {
        self.series
            .x_axis()
            .into_iter()
            .map(|x| self.epoch + x)
            .collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// A time series always holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Distance between consecutive samples, `1 / fs`.
    pub fn deltax(&self) -> f64 {
        self.series.deltax()
    }

    /// Read-only view of the samples.
    pub fn values(&self) -> &[Complex64] {
        self.series.values()
    }

    /// Mutable view of the samples; the length stays fixed.
    pub fn values_mut(&mut self) -> &mut [Complex64] {
        self.series.values_mut()
    }

    /// The sample at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Complex64> {
        self.series.get(index)
    }

    /// The underlying relative-coordinate series.
    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Unwraps into the underlying series, dropping the epoch.
    pub fn into_series(self) -> Series {
        self.series
    }

    /// Real part of every sample; epoch and rate are preserved.
    pub fn real(&self) -> TimeSeries {
        TimeSeries {
            series: self.series.real(),
            epoch: self.epoch,
        }
    }

    /// Imaginary part of every sample; epoch and rate are preserved.
    pub fn imag(&self) -> TimeSeries {
        TimeSeries {
            series: self.series.imag(),
            epoch: self.epoch,
        }
    }

    /// Complex conjugate of every sample; epoch and rate are preserved.
    pub fn conjugate(&self) -> TimeSeries {
        TimeSeries {
            series: self.series.conjugate(),
            epoch: self.epoch,
        }
    }

    /// Resamples onto a new integer rate through the external collaborator.
    ///
    /// Resampling only changes the sample density: the epoch is carried over
    /// unchanged. As with [`Series::resample`], a matching rate returns the
    /// receiver by move without invoking the collaborator.
    pub fn resample<R: Resampler>(self, resampler: &R, new_fs: u32) -> Result<TimeSeries> {
        if new_fs == self.fs() {
            return Ok(self);
        }
        let new_deltax = rate_to_spacing(new_fs)?;
        let values = resampler.resample(self.series.values(), self.fs() as f64, new_fs as f64);
        let series = Series::with_info(values, new_deltax, self.series.info().to_string())?;
        Ok(TimeSeries {
            series,
            epoch: self.epoch,
        })
    }
}

fn rate_to_spacing(fs: u32) -> Result<f64> {
    if fs == 0 {
        return Err(TimeFreqError::InvalidScalar(
            "sample rate must be positive".to_string(),
        ));
    }
    Ok(1.0 / fs as f64)
}

impl Index<usize> for TimeSeries {
    type Output = Complex64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.series[index]
    }
}

impl IndexMut<usize> for TimeSeries {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.series[index]
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.series, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeseries(values: &[f64], epoch: f64, fs: u32) -> TimeSeries {
        TimeSeries::from_real(values, epoch, fs).unwrap()
    }

    #[test]
    fn rate_round_trips_through_spacing() {
        let ts = timeseries(&[1.0, 2.0, 3.0], 0.0, 10);
        assert_eq!(ts.fs(), 10);
        assert!((ts.deltax() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn times_shift_the_axis_by_the_epoch() {
        let ts = timeseries(&[1.0, 2.0, 3.0, 4.0], 2.0, 4);
        let times = ts.times();

        assert_eq!(times.len(), 4);
        assert!((times[0] - 2.0).abs() < f64::EPSILON);
        assert!((times[3] - 2.75).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_rate_and_non_finite_epoch_are_rejected() {
        let err = TimeSeries::from_real(&[1.0], 0.0, 0).unwrap_err();
        assert!(matches!(err, TimeFreqError::InvalidScalar(_)));

        let err = TimeSeries::from_real(&[1.0], f64::INFINITY, 4).unwrap_err();
        assert!(matches!(err, TimeFreqError::InvalidScalar(_)));
    }

    #[test]
    fn anchoring_requires_a_whole_rate() {
        let series = Series::from_real(&[1.0, 2.0], 0.3).unwrap();
        let err = TimeSeries::from_series(series, 0.0).unwrap_err();
        assert!(matches!(err, TimeFreqError::InvalidScalar(_)));

        let series = Series::from_real(&[1.0, 2.0], 0.125).unwrap();
        let ts = TimeSeries::from_series(series, 1.0).unwrap();
        assert_eq!(ts.fs(), 8);
    }

    #[test]
    fn resample_changes_density_but_not_epoch() {
        let ts = timeseries(&[1.0, 2.0, 3.0, 4.0], 5.0, 4);
        let doubled = |values: &[Complex64], current: f64, target: f64| -> Vec<Complex64> {
            assert!((current - 4.0).abs() < f64::EPSILON);
            assert!((target - 8.0).abs() < f64::EPSILON);
            values.iter().flat_map(|&v| [v, v]).collect()
        };

        let dense = ts.resample(&doubled, 8).unwrap();
        assert_eq!(dense.fs(), 8);
        assert_eq!(dense.len(), 8);
        assert!((dense.epoch() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matching_rate_resample_skips_the_collaborator() {
        let never = |_: &[Complex64], _: f64, _: f64| -> Vec<Complex64> {
            panic!("collaborator must not be invoked for a matching rate");
        };

        let ts = timeseries(&[1.0, 2.0], 0.0, 16);
        let same = ts.clone().resample(&never, 16).unwrap();
        assert_eq!(same, ts);
    }
}
