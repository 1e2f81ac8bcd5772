//! Base trait shared by every term structure.

use qf_core::{
    errors::{Error, Result},
    Time,
};
use qf_time::{Date, DayCounter};

/// Base trait for all term structures.
///
/// Every term structure has a reference date (where time zero sits), a day
/// counter to turn dates into year fractions, and a maximum time beyond
/// which evaluation requires extrapolation to be enabled explicitly.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The date at which `t = 0`.
    fn reference_date(&self) -> Date;

    /// The day counter used for date → year-fraction conversion.
    fn day_counter(&self) -> &dyn DayCounter;

    /// The largest time the structure covers.
    fn max_time(&self) -> Time {
        Time::MAX
    }

    /// Whether extrapolation beyond [`max_time`](Self::max_time) is allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Convert a date to a year fraction from the reference date.
    fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), date)
    }

    /// Check that `t` is inside the structure's domain, honouring the
    /// extrapolation setting.
    fn check_range(&self, t: Time) -> Result<()> {
        if t < 0.0 {
            return Err(Error::Precondition(format!(
                "negative time {t} is not allowed"
            )));
        }
        if t > self.max_time() && !self.allows_extrapolation() {
            return Err(Error::OutOfRange {
                t,
                max: self.max_time(),
            });
        }
        Ok(())
    }
}
