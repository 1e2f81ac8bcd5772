//! Black-volatility term structures.

use crate::term_structure::TermStructure;
use qf_core::{errors::Result, Real, Time, Volatility};
use qf_time::{Actual365Fixed, Date, DayCounter};
use std::sync::Arc;

/// A Black-volatility surface σ(t, K).
///
/// Implementors override exactly one of
/// [`black_vol_impl`](Self::black_vol_impl) and
/// [`black_variance_impl`](Self::black_variance_impl); the other is derived.
pub trait BlackVolTermStructure: TermStructure {
    /// The Black volatility for maturity `t` and strike `strike`.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            return 0.0;
        }
        (self.black_variance_impl(t, strike) / t).sqrt()
    }

    /// The Black variance `σ²·t` for maturity `t` and strike `strike`.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol_impl(t, strike);
        vol * vol * t
    }

    /// Range-checked Black volatility by time.
    fn black_vol(&self, t: Time, strike: Real) -> Result<Volatility> {
        self.check_range(t)?;
        Ok(self.black_vol_impl(t, strike))
    }

    /// Range-checked Black variance by time.
    fn black_variance(&self, t: Time, strike: Real) -> Result<Real> {
        self.check_range(t)?;
        Ok(self.black_variance_impl(t, strike))
    }

    /// Black volatility by date.
    fn black_vol_date(&self, date: Date, strike: Real) -> Result<Volatility> {
        self.black_vol(self.time_from_reference(date), strike)
    }
}

/// A flat Black volatility surface: `σ(t, K) = σ` everywhere.
#[derive(Debug)]
pub struct BlackConstantVol {
    reference_date: Date,
    volatility: Volatility,
    day_counter: Arc<dyn DayCounter>,
}

impl BlackConstantVol {
    /// Create a constant Black-vol surface.
    pub fn new(
        reference_date: Date,
        volatility: Volatility,
        day_counter: impl DayCounter + 'static,
    ) -> Self {
        Self {
            reference_date,
            volatility,
            day_counter: Arc::new(day_counter),
        }
    }

    /// Create with the Actual/365 (Fixed) day counter.
    pub fn act365(reference_date: Date, volatility: Volatility) -> Self {
        Self::new(reference_date, volatility, Actual365Fixed)
    }

    /// The constant volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl TermStructure for BlackConstantVol {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_everywhere() {
        let vol = BlackConstantVol::act365(Date::from_ymd(2025, 1, 2).unwrap(), 0.20);
        assert_abs_diff_eq!(vol.black_vol(0.5, 90.0).unwrap(), 0.20, epsilon = 1e-15);
        assert_abs_diff_eq!(vol.black_vol(5.0, 120.0).unwrap(), 0.20, epsilon = 1e-15);
        assert_abs_diff_eq!(vol.black_variance(2.0, 100.0).unwrap(), 0.08, epsilon = 1e-12);
    }

    #[test]
    fn variance_at_zero_maturity() {
        let vol = BlackConstantVol::act365(Date::from_ymd(2025, 1, 2).unwrap(), 0.20);
        assert_abs_diff_eq!(vol.black_variance(0.0, 100.0).unwrap(), 0.0, epsilon = 1e-15);
    }
}
