//! Yield (interest-rate) term structures.

use crate::term_structure::TermStructure;
use qf_core::{errors::Result, DiscountFactor, Rate, Time};
use qf_time::Date;

/// A yield term structure.
///
/// Implementors override exactly one of the three `*_impl` hooks; defaults
/// derive the other two from the mathematical relationships between them.
/// All rates are continuously compounded.
pub trait YieldTermStructure: TermStructure {
    // ── Low-level hooks (override exactly one) ───────────────────────────

    /// The discount factor `P(0, t)`.  Default derives from the zero rate.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// The continuously-compounded zero rate for maturity `t`.
    /// Default derives from the discount factor.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        if t == 0.0 {
            return self.forward_rate_impl(0.0);
        }
        -self.discount_impl(t).ln() / t
    }

    /// The instantaneous forward rate at `t`.  Default uses a centred
    /// difference of the log discount.
    fn forward_rate_impl(&self, t: Time) -> Rate {
        let dt = 1.0e-4;
        let t1 = (t - 0.5 * dt).max(0.0);
        let t2 = t + 0.5 * dt;
        (self.discount_impl(t1).ln() - self.discount_impl(t2).ln()) / (t2 - t1)
    }

    // ── Public interface (range-checked) ─────────────────────────────────

    /// Discount factor for time `t`.
    fn discount(&self, t: Time) -> Result<DiscountFactor> {
        self.check_range(t)?;
        Ok(self.discount_impl(t))
    }

    /// Discount factor for a date.
    fn discount_date(&self, date: Date) -> Result<DiscountFactor> {
        self.discount(self.time_from_reference(date))
    }

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Result<Rate> {
        self.check_range(t)?;
        Ok(self.zero_rate_impl(t))
    }

    /// Continuously-compounded zero rate for a date.
    fn zero_rate_date(&self, date: Date) -> Result<Rate> {
        self.zero_rate(self.time_from_reference(date))
    }

    /// Instantaneous forward rate at `t`.
    fn forward_rate(&self, t: Time) -> Result<Rate> {
        self.check_range(t)?;
        Ok(self.forward_rate_impl(t))
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    fn forward_rate_between(&self, t1: Time, t2: Time) -> Result<Rate> {
        self.check_range(t1)?;
        self.check_range(t2)?;
        if t2 == t1 {
            return Ok(self.forward_rate_impl(t1));
        }
        let df1 = self.discount_impl(t1);
        let df2 = self.discount_impl(t2);
        Ok((df1 / df2).ln() / (t2 - t1))
    }
}
