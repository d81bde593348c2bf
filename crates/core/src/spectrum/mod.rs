use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::multiseries::Slot;
use crate::{MultiSeries, Result, TimeFreqError, TimeSeries};

/// How construction-time epochs map onto rows.
#[derive(Debug, Clone)]
pub enum EpochSpec {
    /// One epoch shared by every initial row.
    Broadcast(f64),
    /// One epoch per row, in the same order as the rows.
    PerRow(Vec<f64>),
}

/// A frequency-ordered collection of time series.
///
/// Rows are [`MultiSeries`] rows keyed by frequency, with one absolute start
/// time per row. The epochs move in lockstep with the keys and rows through
/// every insert and update, so `epochs[i]` is always the start time of the
/// row at `frequencies[i]`. Iteration rebuilds a [`TimeSeries`] per row at
/// the shared sample rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeFreqSpectrum {
    inner: MultiSeries,
    epochs: Vec<f64>,
}

impl TimeFreqSpectrum {
    /// A spectrum with no rows, ready to receive its first append.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a spectrum from parallel rows, frequencies, and epochs at one
    /// sample rate. Rows are fed through the ordered append, so out-of-order
    /// frequencies end up sorted and duplicates collapse onto the last row
    /// given for them.
    pub fn from_rows(
        rows: &[Vec<Complex64>],
        freqs: &[f64],
        epochs: EpochSpec,
        fs: u32,
    ) -> Result<Self> {
        if rows.len() != freqs.len() {
            return Err(TimeFreqError::Shape(format!(
                "incompatible frequency count: {} frequencies for {} rows",
                freqs.len(),
                rows.len()
            )));
        }
        let epochs = match epochs {
            EpochSpec::Broadcast(epoch) => vec![epoch; rows.len()],
            EpochSpec::PerRow(epochs) => {
                if epochs.len() != rows.len() {
                    return Err(TimeFreqError::Shape(format!(
                        "incompatible epoch count: {} epochs for {} rows",
                        epochs.len(),
                        rows.len()
                    )));
                }
                epochs
            }
        };
        let mut out = Self::empty();
        for ((values, &freq), &epoch) in rows.iter().zip(freqs).zip(&epochs) {
            out.append_row(values, freq, epoch, Some(fs))?;
        }
        Ok(out)
    }

    /// Appends a time series under `freq`; its epoch, spacing, and samples
    /// travel together. Same ordering semantics as
    /// [`MultiSeries::append_series`]: insert in frequency order, or
    /// overwrite the row (and its epoch) at an already-present frequency.
    pub fn append(&mut self, timeseries: &TimeSeries, freq: f64) -> Result<()> {
        self.push_row(
            timeseries.values(),
            timeseries.deltax(),
            freq,
            timeseries.epoch(),
        )
    }

    /// Appends a raw buffer under `freq` with an explicit epoch. `fs`
    /// overrides the shared rate; on an empty spectrum it is the only way to
    /// establish one, so omitting it there fails.
    pub fn append_row(
        &mut self,
        values: &[Complex64],
        freq: f64,
        epoch: f64,
        fs: Option<u32>,
    ) -> Result<()> {
        let deltax = match fs {
            Some(0) => {
                return Err(TimeFreqError::InvalidScalar(
                    "sample rate must be positive".to_string(),
                ))
            }
            Some(fs) => 1.0 / fs as f64,
            None => {
                if self.inner.is_empty() {
                    return Err(TimeFreqError::EmptyContainer("raw row append without a rate"));
                }
                self.inner.deltax()?
            }
        };
        self.push_row(values, deltax, freq, epoch)
    }

    fn push_row(
        &mut self,
        values: &[Complex64],
        deltax: f64,
        freq: f64,
        epoch: f64,
    ) -> Result<()> {
        if !epoch.is_finite() {
            return Err(TimeFreqError::InvalidScalar(format!(
                "epoch must be a finite scalar, got {epoch}"
            )));
        }
        if values.is_empty() {
            return Err(TimeFreqError::Shape(
                "row requires at least one sample".to_string(),
            ));
        }
        // The epoch mutates at the exact index the key landed on, inside the
        // same operation, keeping rows, keys, and epochs in lockstep.
        match self.inner.insert_row(values, deltax, freq)? {
            Slot::Replace(index) => self.epochs[index] = epoch,
            Slot::Insert(index) => self.epochs.insert(index, epoch),
        }
        Ok(())
    }

    /// Shared integer sample rate, `1 / deltax`.
    pub fn fs(&self) -> Result<u32> {
        Ok((1.0 / self.inner.deltax()?).round() as u32)
    }

    /// The sorted frequencies, one per row.
    pub fn frequencies(&self) -> Result<&[f64]> {
        self.inner.keys()
    }

    /// The per-row start times, index-aligned with the frequencies.
    pub fn epochs(&self) -> Result<&[f64]> {
        if self.inner.is_empty() {
            return Err(TimeFreqError::EmptyContainer("epochs"));
        }
        Ok(&self.epochs)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    /// Whether any row has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `(row_count, column_count)`; `(0, 0)` while empty.
    pub fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    /// Shared column count.
    pub fn cols(&self) -> Result<usize> {
        self.inner.cols()
    }

    /// Shared sample spacing.
    pub fn deltax(&self) -> Result<f64> {
        self.inner.deltax()
    }

    /// Extent covered by each row, `deltax * column_count`.
    pub fn length(&self) -> Result<f64> {
        self.inner.length()
    }

    /// The uniform time axis shared by every row, relative to its epoch.
    pub fn x_axis(&self) -> Result<Vec<f64>> {
        self.inner.x_axis()
    }

    /// Distance between the highest and lowest frequency.
    pub fn frequency_range(&self) -> Result<f64> {
        self.inner.key_range()
    }

    /// The row at `index` as a standalone time series.
    pub fn row(&self, index: usize) -> Result<TimeSeries> {
        let series = self.inner.row(index)?;
        Ok(TimeSeries::from_parts(series, self.epochs[index]))
    }

    /// The frequency-keyed view of the underlying container.
    pub fn multiseries(&self) -> &MultiSeries {
        &self.inner
    }

    /// Iterates `(frequency, time series)` pairs in ascending frequency
    /// order, rebuilding each row from its samples, its epoch, and the
    /// shared rate.
    pub fn iter(&self) -> SpectrumRows<'_> {
        SpectrumRows {
            spectrum: self,
            index: 0,
        }
    }
}

/// Iterator over `(frequency, row)` pairs of a [`TimeFreqSpectrum`].
pub struct SpectrumRows<'a> {
    spectrum: &'a TimeFreqSpectrum,
    index: usize,
}

impl Iterator for SpectrumRows<'_> {
    type Item = (f64, TimeSeries);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.spectrum.row_count() {
            return None;
        }
        let i = self.index;
        self.index += 1;
        let inner = &self.spectrum.inner;
        Some((
            inner.key_at(i),
            TimeSeries::from_parts(inner.build_row(i), self.spectrum.epochs[i]),
        ))
    }
}

impl<'a> IntoIterator for &'a TimeFreqSpectrum {
    type Item = (f64, TimeSeries);
    type IntoIter = SpectrumRows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeseries(values: &[f64], epoch: f64, fs: u32) -> TimeSeries {
        TimeSeries::from_real(values, epoch, fs).unwrap()
    }

    fn complex_row(fill: f64, len: usize) -> Vec<Complex64> {
        vec![Complex64::new(fill, 0.0); len]
    }

    #[test]
    fn appends_insert_update_and_stay_in_lockstep() {
        let mut spectrum = TimeFreqSpectrum::empty();

        spectrum
            .append(&timeseries(&[1.0; 5], 0.0, 10), 20.0)
            .unwrap();
        assert_eq!(spectrum.row_count(), 1);
        assert_eq!(spectrum.frequencies().unwrap(), &[20.0]);
        assert_eq!(spectrum.fs().unwrap(), 10);

        spectrum
            .append(&timeseries(&[2.0; 5], 1.0, 10), 10.0)
            .unwrap();
        assert_eq!(spectrum.frequencies().unwrap(), &[10.0, 20.0]);
        assert_eq!(spectrum.epochs().unwrap(), &[1.0, 0.0]);

        // Collision at 20 Hz replaces the row and its epoch in place.
        spectrum
            .append(&timeseries(&[3.0; 5], 2.0, 10), 20.0)
            .unwrap();
        assert_eq!(spectrum.row_count(), 2);
        assert_eq!(spectrum.frequencies().unwrap(), &[10.0, 20.0]);
        assert_eq!(spectrum.epochs().unwrap(), &[1.0, 2.0]);

        let replaced = spectrum.row(1).unwrap();
        assert!((replaced[0].re - 3.0).abs() < f64::EPSILON);
        assert!((replaced.epoch() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lockstep_survives_long_interleavings() {
        let mut spectrum = TimeFreqSpectrum::empty();
        let appends = [
            (40.0, 0.0),
            (10.0, 1.0),
            (30.0, 2.0),
            (10.0, 3.0),
            (20.0, 4.0),
            (40.0, 5.0),
            (15.0, 6.0),
        ];
        for (freq, epoch) in appends {
            spectrum
                .append(&timeseries(&[freq; 4], epoch, 8), freq)
                .unwrap();
        }

        let freqs = spectrum.frequencies().unwrap();
        assert_eq!(freqs, &[10.0, 15.0, 20.0, 30.0, 40.0]);
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(spectrum.epochs().unwrap().len(), spectrum.row_count());
        assert_eq!(spectrum.epochs().unwrap(), &[3.0, 6.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn iteration_yields_ascending_time_series_rows() {
        let mut spectrum = TimeFreqSpectrum::empty();
        spectrum
            .append(&timeseries(&[1.0, 2.0], 0.5, 4), 30.0)
            .unwrap();
        spectrum
            .append(&timeseries(&[3.0, 4.0], 1.5, 4), 10.0)
            .unwrap();

        let rows: Vec<(f64, TimeSeries)> = spectrum.iter().collect();
        assert_eq!(rows.len(), 2);

        let (freq, row) = &rows[0];
        assert!((freq - 10.0).abs() < f64::EPSILON);
        assert!((row.epoch() - 1.5).abs() < f64::EPSILON);
        assert_eq!(row.fs(), 4);
        assert!((row[0].re - 3.0).abs() < f64::EPSILON);

        let (freq, row) = &rows[1];
        assert!((freq - 30.0).abs() < f64::EPSILON);
        assert!((row.epoch() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn broadcast_epoch_covers_every_initial_row() {
        let rows = vec![complex_row(1.0, 3), complex_row(2.0, 3)];
        let spectrum =
            TimeFreqSpectrum::from_rows(&rows, &[10.0, 20.0], EpochSpec::Broadcast(7.0), 16)
                .unwrap();

        assert_eq!(spectrum.epochs().unwrap(), &[7.0, 7.0]);
        assert_eq!(spectrum.fs().unwrap(), 16);
    }

    #[test]
    fn per_row_epochs_must_match_the_row_count() {
        let rows = vec![complex_row(1.0, 2), complex_row(2.0, 2)];
        let err = TimeFreqSpectrum::from_rows(
            &rows,
            &[10.0, 20.0],
            EpochSpec::PerRow(vec![0.0]),
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TimeFreqError::Shape(_)));

        let spectrum = TimeFreqSpectrum::from_rows(
            &rows,
            &[20.0, 10.0],
            EpochSpec::PerRow(vec![0.5, 1.5]),
            8,
        )
        .unwrap();
        // Epochs follow their rows through the sort.
        assert_eq!(spectrum.frequencies().unwrap(), &[10.0, 20.0]);
        assert_eq!(spectrum.epochs().unwrap(), &[1.5, 0.5]);
    }

    #[test]
    fn raw_append_requires_a_rate_on_an_empty_spectrum() {
        let mut spectrum = TimeFreqSpectrum::empty();
        let buffer = complex_row(1.0, 4);

        let err = spectrum.append_row(&buffer, 10.0, 0.0, None).unwrap_err();
        assert!(matches!(err, TimeFreqError::EmptyContainer(_)));
        assert!(spectrum.is_empty());

        spectrum.append_row(&buffer, 10.0, 0.0, Some(4)).unwrap();
        assert_eq!(spectrum.fs().unwrap(), 4);

        // Later raw rows adopt the established rate.
        spectrum.append_row(&buffer, 20.0, 1.0, None).unwrap();
        assert_eq!(spectrum.row_count(), 2);
    }

    #[test]
    fn failed_append_leaves_the_spectrum_untouched() {
        let mut spectrum = TimeFreqSpectrum::empty();
        spectrum
            .append(&timeseries(&[1.0; 4], 0.0, 8), 10.0)
            .unwrap();
        let snapshot = spectrum.clone();

        let err = spectrum
            .append(&timeseries(&[1.0; 3], 1.0, 8), 20.0)
            .unwrap_err();
        assert!(matches!(err, TimeFreqError::Shape(_)));
        assert_eq!(spectrum, snapshot);

        let err = spectrum
            .append(&timeseries(&[1.0; 4], 1.0, 16), 20.0)
            .unwrap_err();
        assert!(matches!(err, TimeFreqError::Shape(_)));
        assert_eq!(spectrum, snapshot);

        let err = spectrum
            .append_row(&complex_row(1.0, 4), 20.0, f64::NAN, None)
            .unwrap_err();
        assert!(matches!(err, TimeFreqError::InvalidScalar(_)));
        assert_eq!(spectrum, snapshot);
    }

    #[test]
    fn empty_spectrum_rejects_shape_dependent_accessors() {
        let spectrum = TimeFreqSpectrum::empty();

        assert_eq!(spectrum.row_count(), 0);
        assert_eq!(spectrum.shape(), (0, 0));
        assert!(matches!(
            spectrum.fs().unwrap_err(),
            TimeFreqError::EmptyContainer(_)
        ));
        assert!(matches!(
            spectrum.frequencies().unwrap_err(),
            TimeFreqError::EmptyContainer(_)
        ));
        assert!(matches!(
            spectrum.epochs().unwrap_err(),
            TimeFreqError::EmptyContainer(_)
        ));
        assert!(matches!(
            spectrum.frequency_range().unwrap_err(),
            TimeFreqError::EmptyContainer(_)
        ));
        assert_eq!(spectrum.iter().count(), 0);
    }
}
