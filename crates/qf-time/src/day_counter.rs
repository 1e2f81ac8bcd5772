//! Day-count conventions.
//!
//! A day counter computes the fraction of a year between two dates, the
//! quantity every discount factor and accrual calculation is built on.

use crate::date::Date;
use qf_core::{Real, Time};

/// A convention for counting days and year fractions between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of the convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` under this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64;

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;

    /// Year fraction with reference-period hints, needed by some ISDA-style
    /// conventions.  Defaults to the plain [`year_fraction`][Self::year_fraction].
    fn year_fraction_with_ref(&self, d1: Date, d2: Date, _ref_start: Date, _ref_end: Date) -> Time {
        self.year_fraction(d1, d2)
    }
}

/// Actual/365 (Fixed): actual days divided by 365.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2 - d1) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360: actual days divided by 360.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2 - d1) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// 30/360 (Bond Basis): months count 30 days, years count 360.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &str {
        "30/360 (Bond Basis)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let (y1, m1, mut dd1) = d1.ymd();
        let (y2, m2, mut dd2) = d2.ymd();
        if dd1 == 31 {
            dd1 = 30;
        }
        if dd2 == 31 && dd1 == 30 {
            dd2 = 30;
        }
        360 * (y2 - y1) as i64 + 30 * (m2 as i64 - m1 as i64) + (dd2 as i64 - dd1 as i64)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}
