use num_complex::Complex64;

/// External resampling collaborator.
///
/// Implementations map a uniformly sampled buffer at `current_rate` onto an
/// equivalent buffer at `target_rate`. The call must be deterministic for a
/// given input and leave the input untouched; the output length is owned by
/// the implementation (a typical kernel returns
/// `round(len * target_rate / current_rate)` samples).
///
/// The numerical kernel itself lives outside this crate. [`Series::resample`]
/// and [`TimeSeries::resample`] only invoke the collaborator when the rate
/// actually changes.
///
/// [`Series::resample`]: crate::Series::resample
/// [`TimeSeries::resample`]: crate::TimeSeries::resample
pub trait Resampler {
    fn resample(
        &self,
        values: &[Complex64],
        current_rate: f64,
        target_rate: f64,
    ) -> Vec<Complex64>;
}

/// Plain functions and closures work as collaborators directly.
impl<F> Resampler for F
where
    F: Fn(&[Complex64], f64, f64) -> Vec<Complex64>,
{
    fn resample(
        &self,
        values: &[Complex64],
        current_rate: f64,
        target_rate: f64,
    ) -> Vec<Complex64> {
        self(values, current_rate, target_rate)
    }
}
