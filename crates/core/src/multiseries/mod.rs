use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{Result, Series, TimeFreqError};

/// Where the ordered append placed a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// An existing row at this index was overwritten.
    Replace(usize),
    /// A new row was inserted at this index.
    Insert(usize),
}

/// An ordered collection of uniformly sampled rows.
///
/// Rows share one sample spacing and one column count, both established by
/// the first appended row, and are kept sorted by a strictly ascending key.
/// Appending at an already-present key overwrites that row in place;
/// appending anywhere else inserts while preserving the order. Storage is
/// row-major, so iteration order and key order always coincide.
///
/// The container is single-writer: an append locates the target index and
/// then mutates, with no internal synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSeries {
    data: Vec<Complex64>,
    cols: usize,
    deltax: f64,
    keys: Vec<f64>,
}

impl MultiSeries {
    /// A container with no rows. Spacing and keys stay undefined until the
    /// first append; shape-dependent accessors fail until then.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a container by feeding `rows` through the ordered append, so
    /// out-of-order input ends up sorted and duplicate keys collapse onto
    /// the last row given for them.
    pub fn from_rows(rows: &[Vec<Complex64>], keys: &[f64], deltax: f64) -> Result<Self> {
        if rows.len() != keys.len() {
            return Err(TimeFreqError::Shape(format!(
                "incompatible key count: {} keys for {} rows",
                keys.len(),
                rows.len()
            )));
        }
        let mut out = Self::empty();
        for (values, &key) in rows.iter().zip(keys) {
            let series = Series::new(values.clone(), deltax)?;
            out.append_series(&series, key)?;
        }
        Ok(out)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.keys.len()
    }

    /// Whether any row has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(row_count, column_count)`; `(0, 0)` while empty.
    pub fn shape(&self) -> (usize, usize) {
        (self.keys.len(), self.cols)
    }

    fn ensure_rows(&self, what: &'static str) -> Result<()> {
        if self.is_empty() {
            return Err(TimeFreqError::EmptyContainer(what));
        }
        Ok(())
    }

    /// Shared column count.
    pub fn cols(&self) -> Result<usize> {
        self.ensure_rows("column count")?;
        Ok(self.cols)
    }

    /// Shared sample spacing.
    pub fn deltax(&self) -> Result<f64> {
        self.ensure_rows("sample spacing")?;
        Ok(self.deltax)
    }

    /// Extent covered by each row, `deltax * column_count`.
    pub fn length(&self) -> Result<f64> {
        self.ensure_rows("length")?;
        Ok(self.deltax * self.cols as f64)
    }

    /// The uniform coordinate axis shared by every row.
    pub fn x_axis(&self) -> Result<Vec<f64>> {
        self.ensure_rows("x axis")?;
        Ok((0..self.cols).map(|i| i as f64 * self.deltax).collect())
    }

    /// The sorted keys, one per row.
    pub fn keys(&self) -> Result<&[f64]> {
        self.ensure_rows("keys")?;
        Ok(&self.keys)
    }

    /// Distance between the largest and smallest key.
    pub fn key_range(&self) -> Result<f64> {
        self.ensure_rows("key range")?;
        Ok(self.keys[self.keys.len() - 1] - self.keys[0])
    }

    /// The row at `index` as a standalone series.
    pub fn row(&self, index: usize) -> Result<Series> {
        self.ensure_rows("row access")?;
        if index >= self.keys.len() {
            return Err(TimeFreqError::InvalidIndex(format!(
                "row {index} out of range for {} rows",
                self.keys.len()
            )));
        }
        Ok(self.build_row(index))
    }

    fn row_slice(&self, index: usize) -> &[Complex64] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    pub(crate) fn build_row(&self, index: usize) -> Series {
        Series::from_parts(self.row_slice(index).to_vec(), self.deltax, "Series".to_string())
    }

    pub(crate) fn key_at(&self, index: usize) -> f64 {
        self.keys[index]
    }

    /// Appends a series under `key`, inserting in key order or overwriting
    /// an existing row with the same key.
    ///
    /// The first append adopts the series' spacing and length as the shared
    /// shape; later appends must match both. Validation happens before any
    /// mutation, so a failed append leaves the container untouched.
    pub fn append_series(&mut self, series: &Series, key: f64) -> Result<()> {
        self.insert_row(series.values(), series.deltax(), key)?;
        Ok(())
    }

    /// Appends a raw buffer under `key`, adopting the container's shared
    /// spacing. An empty container has no spacing to adopt, so the first
    /// row must arrive as a [`Series`].
    pub fn append_row(&mut self, values: &[Complex64], key: f64) -> Result<()> {
        self.ensure_rows("raw row append")?;
        self.insert_row(values, self.deltax, key)?;
        Ok(())
    }

    pub(crate) fn insert_row(
        &mut self,
        values: &[Complex64],
        deltax: f64,
        key: f64,
    ) -> Result<Slot> {
        if !key.is_finite() {
            return Err(TimeFreqError::InvalidScalar(format!(
                "key must be a finite scalar, got {key}"
            )));
        }
        if self.is_empty() {
            self.data = values.to_vec();
            self.cols = values.len();
            self.deltax = deltax;
            self.keys.push(key);
            return Ok(Slot::Insert(0));
        }
        if values.len() != self.cols {
            return Err(TimeFreqError::Shape(format!(
                "incompatible row length: {} != {}",
                values.len(),
                self.cols
            )));
        }
        if deltax != self.deltax {
            return Err(TimeFreqError::Shape(format!(
                "incompatible spacing: {} != {}",
                deltax, self.deltax
            )));
        }

        // First index whose key is not below the new one; everything past
        // the current maximum lands at the end.
        let index = self.keys.partition_point(|&k| k < key);
        if index < self.keys.len() && self.keys[index] == key {
            let start = index * self.cols;
            self.data[start..start + self.cols].copy_from_slice(values);
            Ok(Slot::Replace(index))
        } else {
            let at = index * self.cols;
            self.data.splice(at..at, values.iter().copied());
            self.keys.insert(index, key);
            Ok(Slot::Insert(index))
        }
    }

    /// Iterates `(key, row)` pairs in ascending key order.
    pub fn iter(&self) -> Rows<'_> {
        Rows {
            container: self,
            index: 0,
        }
    }
}

/// Iterator over `(key, row)` pairs of a [`MultiSeries`].
pub struct Rows<'a> {
    container: &'a MultiSeries,
    index: usize,
}

impl Iterator for Rows<'_> {
    type Item = (f64, Series);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.container.row_count() {
            return None;
        }
        let i = self.index;
        self.index += 1;
        Some((self.container.keys[i], self.container.build_row(i)))
    }
}

impl<'a> IntoIterator for &'a MultiSeries {
    type Item = (f64, Series);
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
