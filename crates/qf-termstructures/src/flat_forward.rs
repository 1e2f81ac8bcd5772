//! `FlatForward` — the constant-rate yield curve.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use qf_core::{Rate, Time};
use qf_time::{Actual365Fixed, Date, DayCounter};
use std::sync::Arc;

/// A flat (constant continuously-compounded forward rate) yield curve.
///
/// Discount factors are `P(t) = e^{−r·t}` for all maturities; the curve has
/// no maximum date.
#[derive(Debug)]
pub struct FlatForward {
    reference_date: Date,
    rate: Rate,
    day_counter: Arc<dyn DayCounter>,
    extrapolate: bool,
}

impl FlatForward {
    /// Create a flat curve at the given continuously-compounded rate.
    pub fn new(reference_date: Date, rate: Rate, day_counter: impl DayCounter + 'static) -> Self {
        Self {
            reference_date,
            rate,
            day_counter: Arc::new(day_counter),
            extrapolate: false,
        }
    }

    /// Create a flat curve with the Actual/365 (Fixed) day counter.
    pub fn act365(reference_date: Date, rate: Rate) -> Self {
        Self::new(reference_date, rate, Actual365Fixed)
    }

    /// Enable extrapolation (a flat curve extrapolates trivially; this is
    /// kept for interface symmetry with bounded curves).
    pub fn with_extrapolation(mut self) -> Self {
        self.extrapolate = true;
        self
    }

    /// The flat continuously-compounded rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn allows_extrapolation(&self) -> bool {
        self.extrapolate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> f64 {
        (-self.rate * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn curve() -> FlatForward {
        FlatForward::act365(Date::from_ymd(2025, 1, 2).unwrap(), 0.05)
    }

    #[test]
    fn discount_factors() {
        let c = curve();
        assert_abs_diff_eq!(c.discount(0.0).unwrap(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(c.discount(1.0).unwrap(), (-0.05_f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(c.discount(10.0).unwrap(), (-0.5_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn rates_are_flat() {
        let c = curve();
        assert_abs_diff_eq!(c.zero_rate(0.5).unwrap(), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(c.forward_rate(3.0).unwrap(), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(c.forward_rate_between(1.0, 2.0).unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn date_overloads() {
        let c = curve();
        let d = Date::from_ymd(2026, 1, 2).unwrap();
        let t = c.time_from_reference(d);
        assert_abs_diff_eq!(t, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            c.discount_date(d).unwrap(),
            (-0.05 * t).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn negative_time_is_rejected() {
        assert!(curve().discount(-0.5).is_err());
    }
}
