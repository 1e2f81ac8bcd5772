//! The generalized Black-Scholes process.
//!
//! `dS/S = (r(t) − q(t)) dt + σ(t, S) dW`
//!
//! The process bundles a live spot quote with the risk-free curve, the
//! dividend-yield curve, and the Black volatility surface. Engines read the
//! scalars they need through the sampling helpers and track the spot quote's
//! version to invalidate cached results.

use qf_core::{
    errors::{Error, Result},
    Rate, Real, Time, Volatility,
};
use qf_quotes::{Quote, SimpleQuote};
use qf_termstructures::{BlackVolTermStructure, TermStructure, YieldTermStructure};
use qf_time::Date;
use std::sync::Arc;

/// A generalized Black-Scholes process.
#[derive(Debug)]
pub struct GeneralizedBlackScholesProcess {
    spot: Arc<SimpleQuote>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
}

impl GeneralizedBlackScholesProcess {
    /// Create a process from a spot quote and the three curves.
    pub fn new(
        spot: Arc<SimpleQuote>,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self {
            spot,
            risk_free_rate,
            dividend_yield,
            black_vol,
        }
    }

    /// The current spot price; fails while the quote is unset.
    pub fn spot(&self) -> Result<Real> {
        self.spot.value().ok_or(Error::NullValue)
    }

    /// The version of the spot quote (see `qf_quotes::Quote::version`).
    pub fn spot_version(&self) -> u64 {
        self.spot.version()
    }

    /// The valuation date (reference date of the risk-free curve).
    pub fn reference_date(&self) -> Date {
        self.risk_free_rate.reference_date()
    }

    /// Year fraction from the valuation date under the risk-free curve's
    /// day counter.
    pub fn time_from_reference(&self, date: Date) -> Time {
        self.risk_free_rate.time_from_reference(date)
    }

    /// The risk-free curve.
    pub fn risk_free_rate(&self) -> &dyn YieldTermStructure {
        &*self.risk_free_rate
    }

    /// The dividend-yield curve.
    pub fn dividend_yield(&self) -> &dyn YieldTermStructure {
        &*self.dividend_yield
    }

    /// The Black volatility surface.
    pub fn black_volatility(&self) -> &dyn BlackVolTermStructure {
        &*self.black_vol
    }

    /// Continuously-compounded risk-free zero rate to maturity `t`.
    pub fn zero_rate(&self, t: Time) -> Result<Rate> {
        self.risk_free_rate.zero_rate(t)
    }

    /// Continuously-compounded dividend zero rate to maturity `t`.
    pub fn dividend_rate(&self, t: Time) -> Result<Rate> {
        self.dividend_yield.zero_rate(t)
    }

    /// Black volatility for maturity `t` and strike `strike`.
    pub fn black_vol(&self, t: Time, strike: Real) -> Result<Volatility> {
        self.black_vol.black_vol(t, strike)
    }

    /// Instantaneous forward risk-free rate at `t` (used by time-dependent
    /// differential operators).
    pub fn forward_rate(&self, t: Time) -> Result<Rate> {
        self.risk_free_rate.forward_rate(t)
    }

    /// Instantaneous forward dividend rate at `t`.
    pub fn forward_dividend_rate(&self, t: Time) -> Result<Rate> {
        self.dividend_yield.forward_rate(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qf_termstructures::{BlackConstantVol, FlatForward};

    fn make_process() -> GeneralizedBlackScholesProcess {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        GeneralizedBlackScholesProcess::new(
            Arc::new(SimpleQuote::new(100.0)),
            Arc::new(FlatForward::act365(ref_date, 0.05)),
            Arc::new(FlatForward::act365(ref_date, 0.02)),
            Arc::new(BlackConstantVol::act365(ref_date, 0.20)),
        )
    }

    #[test]
    fn scalar_sampling() {
        let p = make_process();
        assert_abs_diff_eq!(p.spot().unwrap(), 100.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.zero_rate(1.0).unwrap(), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(p.dividend_rate(1.0).unwrap(), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(p.black_vol(1.0, 100.0).unwrap(), 0.20, epsilon = 1e-15);
    }

    #[test]
    fn spot_version_moves_with_quote() {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        let spot = Arc::new(SimpleQuote::new(100.0));
        let p = GeneralizedBlackScholesProcess::new(
            Arc::clone(&spot),
            Arc::new(FlatForward::act365(ref_date, 0.05)),
            Arc::new(FlatForward::act365(ref_date, 0.0)),
            Arc::new(BlackConstantVol::act365(ref_date, 0.20)),
        );
        let v0 = p.spot_version();
        spot.set_value(101.0);
        assert!(p.spot_version() > v0);
        assert_abs_diff_eq!(p.spot().unwrap(), 101.0, epsilon = 1e-15);
    }
}
