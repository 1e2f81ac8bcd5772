//! `ZeroCurve` — a yield curve interpolated through zero-rate pillars.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use qf_core::{ensure, errors::Result, Rate, Time};
use qf_math::{Interpolation1D, NaturalCubicSpline};
use qf_time::{Actual365Fixed, Date, DayCounter};
use std::sync::Arc;

/// A yield term structure built from continuously-compounded zero rates at
/// pillar times, natural-cubic-spline interpolated in between.
///
/// The curve is bounded by its last pillar: evaluation beyond it fails with
/// `OutOfRange` unless extrapolation is enabled, in which case the spline's
/// end segment continues.
#[derive(Debug)]
pub struct ZeroCurve {
    reference_date: Date,
    times: Vec<Time>,
    interpolation: NaturalCubicSpline,
    day_counter: Arc<dyn DayCounter>,
    extrapolate: bool,
}

impl ZeroCurve {
    /// Build a curve from pillar times (strictly increasing, the first at
    /// or after zero) and matching zero rates.
    pub fn new(
        reference_date: Date,
        times: &[Time],
        zero_rates: &[Rate],
        day_counter: impl DayCounter + 'static,
    ) -> Result<Self> {
        ensure!(
            times.first().is_some_and(|&t| t >= 0.0),
            "the first pillar must not be negative"
        );
        let interpolation = NaturalCubicSpline::new(times, zero_rates)?;
        Ok(Self {
            reference_date,
            times: times.to_vec(),
            interpolation,
            day_counter: Arc::new(day_counter),
            extrapolate: false,
        })
    }

    /// Build with the Actual/365 (Fixed) day counter.
    pub fn act365(reference_date: Date, times: &[Time], zero_rates: &[Rate]) -> Result<Self> {
        Self::new(reference_date, times, zero_rates, Actual365Fixed)
    }

    /// Allow evaluation beyond the last pillar.
    pub fn with_extrapolation(mut self) -> Self {
        self.extrapolate = true;
        self
    }

    /// The pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}

impl TermStructure for ZeroCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn max_time(&self) -> Time {
        *self.times.last().expect("curve holds at least three pillars")
    }

    fn allows_extrapolation(&self) -> bool {
        self.extrapolate
    }
}

impl YieldTermStructure for ZeroCurve {
    fn zero_rate_impl(&self, t: Time) -> Rate {
        self.interpolation.value(t)
    }
}
