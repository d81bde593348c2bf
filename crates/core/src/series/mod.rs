use std::fmt;
use std::ops::{Index, IndexMut};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{Resampler, Result, TimeFreqError};

/// A uniformly sampled one-dimensional sequence.
///
/// The buffer length is fixed at construction; the only in-place mutation is
/// element assignment through [`IndexMut`] or [`Series::values_mut`]. Every
/// transformation (slicing, selection, resampling, the real/imaginary and
/// conjugate views) produces a new series and leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    values: Vec<Complex64>,
    deltax: f64,
    info: String,
}

/// Slice bounds with an optional stride.
///
/// An explicit struct instead of a dynamically inspected argument: `start`
/// and `stop` follow the usual slicing conventions (a negative `stop` counts
/// from the end, `stop` past the end clamps), but a negative `start` is
/// rejected outright and the stride must be positive. A stride of `s`
/// multiplies the resulting sample spacing by `s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceSpec {
    /// The full sequence.
    pub fn all() -> Self {
        Self::default()
    }

    /// A contiguous `[start, stop)` window.
    pub fn range(start: i64, stop: i64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// Applies a stride to the selection.
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
}

/// Result of an explicit index selection.
///
/// Selecting a single position yields the bare sample rather than a
/// one-element series; anything longer comes back wrapped.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Scalar(Complex64),
    Series(Series),
}

impl Series {
    /// Creates a series from complex samples and a positive sample spacing.
    pub fn new(values: Vec<Complex64>, deltax: f64) -> Result<Self> {
        Self::with_info(values, deltax, "Series")
    }

    /// Creates a series with an explicit diagnostic label.
    pub fn with_info(values: Vec<Complex64>, deltax: f64, info: impl Into<String>) -> Result<Self> {
        if values.is_empty() {
            return Err(TimeFreqError::Shape(
                "series requires at least one sample".to_string(),
            ));
        }
        if !deltax.is_finite() || deltax <= 0.0 {
            return Err(TimeFreqError::InvalidScalar(format!(
                "sample spacing must be positive and finite, got {deltax}"
            )));
        }
        Ok(Self {
            values,
            deltax,
            info: info.into(),
        })
    }

    /// Creates a series from real samples, widening them to complex.
    pub fn from_real(values: &[f64], deltax: f64) -> Result<Self> {
        Self::new(
            values.iter().map(|&v| Complex64::new(v, 0.0)).collect(),
            deltax,
        )
    }

    /// Skips validation for buffers whose invariants are already guaranteed
    /// by the containers that own them.
    pub(crate) fn from_parts(values: Vec<Complex64>, deltax: f64, info: String) -> Self {
        Self {
            values,
            deltax,
            info,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A series always holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Distance between consecutive samples.
    pub fn deltax(&self) -> f64 {
        self.deltax
    }

    /// Diagnostic label.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Total extent covered by the samples, `deltax * len`.
    pub fn length(&self) -> f64 {
        self.deltax * self.values.len() as f64
    }

    /// The uniform coordinate axis `[0, deltax, 2 * deltax, ...]`.
    pub fn x_axis(&self) -> Vec<f64> {
        (0..self.values.len()).map(|i| i as f64 * self.deltax).collect()
    }

    /// Read-only view of the samples.
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Mutable view of the samples. Elements can be reassigned freely; the
    /// slice form keeps the length fixed.
    pub fn values_mut(&mut self) -> &mut [Complex64] {
        &mut self.values
    }

    /// The sample at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Complex64> {
        self.values.get(index).copied()
    }

    /// Real part of every sample, as a new series labelled `Re_...`.
    pub fn real(&self) -> Series {
        self.derived("Re_", self.values.iter().map(|v| Complex64::new(v.re, 0.0)).collect())
    }

    /// Imaginary part of every sample, as a new series labelled `Im_...`.
    pub fn imag(&self) -> Series {
        self.derived("Im_", self.values.iter().map(|v| Complex64::new(v.im, 0.0)).collect())
    }

    /// Complex conjugate of every sample, as a new series labelled `Conj_...`.
    pub fn conjugate(&self) -> Series {
        self.derived("Conj_", self.values.iter().map(|v| v.conj()).collect())
    }

    /// Magnitude of every sample.
    pub fn magnitude(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.norm()).collect()
    }

    fn derived(&self, prefix: &str, values: Vec<Complex64>) -> Series {
        Series {
            values,
            deltax: self.deltax,
            info: format!("{prefix}{}", self.info),
        }
    }

    /// Extracts a contiguous (optionally strided) window as a new series.
    ///
    /// A stride of `s` rescales the spacing to `deltax * s`. A negative
    /// start, a non-positive stride, or a window that selects nothing fails
    /// without producing a series.
    pub fn slice(&self, spec: SliceSpec) -> Result<Series> {
        if let Some(start) = spec.start {
            if start < 0 {
                return Err(TimeFreqError::InvalidIndex(format!(
                    "negative start index ({start}) is not supported"
                )));
            }
        }
        let step = spec.step.unwrap_or(1);
        if step < 1 {
            return Err(TimeFreqError::InvalidIndex(format!(
                "slice step must be positive, got {step}"
            )));
        }
        let len = self.values.len() as i64;
        let start = spec.start.unwrap_or(0).min(len);
        let stop = match spec.stop {
            Some(stop) if stop < 0 => (len + stop).max(0),
            Some(stop) => stop.min(len),
            None => len,
        };
        let stop = stop.max(start);
        let values: Vec<Complex64> = self.values[start as usize..stop as usize]
            .iter()
            .step_by(step as usize)
            .copied()
            .collect();
        Series::with_info(values, self.deltax * step as f64, self.info.clone())
    }

    /// Selects samples at explicit positions.
    ///
    /// A lone index yields the bare sample. Longer index arrays must form a
    /// strictly ascending arithmetic progression (checked through the
    /// consecutive differences); the stride between selected positions
    /// rescales the spacing of the resulting series.
    pub fn select(&self, indices: &[usize]) -> Result<Selection> {
        match indices {
            [] => Err(TimeFreqError::InvalidIndex(
                "empty index array".to_string(),
            )),
            [index] => self
                .get(*index)
                .map(Selection::Scalar)
                .ok_or_else(|| self.out_of_range(*index)),
            _ => {
                let stride = indices[1].wrapping_sub(indices[0]);
                let uniform = indices
                    .windows(2)
                    .all(|w| w[1] > w[0] && w[1] - w[0] == stride);
                if !uniform {
                    return Err(TimeFreqError::InvalidIndex(format!(
                        "selected indices are not uniformly ascending: {indices:?}"
                    )));
                }
                let last = indices[indices.len() - 1];
                if last >= self.values.len() {
                    return Err(self.out_of_range(last));
                }
                let values = indices.iter().map(|&i| self.values[i]).collect();
                Series::with_info(values, self.deltax * stride as f64, self.info.clone())
                    .map(Selection::Series)
            }
        }
    }

    fn out_of_range(&self, index: usize) -> TimeFreqError {
        TimeFreqError::InvalidIndex(format!(
            "index {index} out of range for {} samples",
            self.values.len()
        ))
    }

    /// Resamples onto a new spacing through the external collaborator.
    ///
    /// When `new_deltax` already matches, the receiver is returned by move
    /// unchanged: the collaborator is not invoked and nothing is allocated.
    /// Callers that need the original afterwards should clone first.
    pub fn resample<R: Resampler>(self, resampler: &R, new_deltax: f64) -> Result<Series> {
        if !new_deltax.is_finite() || new_deltax <= 0.0 {
            return Err(TimeFreqError::InvalidScalar(format!(
                "sample spacing must be positive and finite, got {new_deltax}"
            )));
        }
        if new_deltax == self.deltax {
            return Ok(self);
        }
        let values = resampler.resample(&self.values, 1.0 / self.deltax, 1.0 / new_deltax);
        Series::with_info(values, new_deltax, self.info)
    }
}

impl Index<usize> for Series {
    type Output = Complex64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<usize> for Series {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.info)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Complex64;
    type IntoIter = std::slice::Iter<'a, Complex64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
