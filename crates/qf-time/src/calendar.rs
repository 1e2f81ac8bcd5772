//! Business-day calendars.
//!
//! A calendar knows which dates are business days and can adjust dates
//! according to a [`BusinessDayConvention`] or advance them by a number of
//! business days or calendar units.

use crate::business_day_convention::BusinessDayConvention;
use crate::date::{days_in_month, Date};
use crate::time_unit::TimeUnit;
use crate::weekday::Weekday;
use qf_core::errors::Result;

/// A financial calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"TARGET"`).
    fn name(&self) -> &str;

    /// Whether `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// Whether `date` is a holiday (non-business day).
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Roll `date` onto a business day according to `convention`.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => {
                let mut d = date;
                while self.is_holiday(d) {
                    d = d + 1;
                }
                d
            }
            BusinessDayConvention::Preceding => {
                let mut d = date;
                while self.is_holiday(d) {
                    d = d - 1;
                }
                d
            }
            BusinessDayConvention::ModifiedFollowing => {
                let rolled = self.adjust(date, BusinessDayConvention::Following);
                if rolled.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Preceding)
                } else {
                    rolled
                }
            }
            BusinessDayConvention::ModifiedPreceding => {
                let rolled = self.adjust(date, BusinessDayConvention::Preceding);
                if rolled.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Following)
                } else {
                    rolled
                }
            }
        }
    }

    /// Advance `date` by `n` units.  For [`TimeUnit::Days`] the count is in
    /// business days; for the other units the calendar advances and then
    /// rolls with the given convention.
    fn advance(
        &self,
        date: Date,
        n: i32,
        unit: TimeUnit,
        convention: BusinessDayConvention,
    ) -> Result<Date> {
        match unit {
            TimeUnit::Days => {
                let step = if n >= 0 { 1 } else { -1 };
                let mut remaining = n.abs();
                let mut d = date;
                while remaining > 0 {
                    d = d.add_days(step)?;
                    if self.is_business_day(d) {
                        remaining -= 1;
                    }
                }
                Ok(d)
            }
            _ => {
                let advanced = date.advance(n, unit)?;
                Ok(self.adjust(advanced, convention))
            }
        }
    }

    /// Count business days in `(d1, d2]`; negative when `d2 < d1`.
    fn business_days_between(&self, d1: Date, d2: Date) -> i32 {
        if d1 == d2 {
            return 0;
        }
        let (start, end, sign) = if d2 > d1 { (d1, d2, 1) } else { (d2, d1, -1) };
        let mut count = 0;
        let mut d = start + 1;
        while d <= end {
            if self.is_business_day(d) {
                count += 1;
            }
            d = d + 1;
        }
        sign * count
    }
}

/// A calendar on which every day is a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// A calendar with no holidays beyond Saturdays and Sundays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.weekday().is_weekend()
    }
}

/// The TARGET calendar (Trans-european Automated Real-time Gross settlement
/// Express Transfer), the euro-area settlement calendar.
///
/// Holidays: weekends, New Year's Day, Good Friday and Easter Monday
/// (from 2000), Labour Day (from 2000), Christmas, and Boxing Day (from 2000).
#[derive(Debug, Clone, Copy, Default)]
pub struct Target;

impl Calendar for Target {
    fn name(&self) -> &str {
        "TARGET"
    }

    fn is_business_day(&self, date: Date) -> bool {
        let w = date.weekday();
        if w.is_weekend() {
            return false;
        }
        let (y, m, d) = date.ymd();
        let em = easter_monday_day_of_year(y);
        let doy = day_of_year(y, m, d);
        if (d == 1 && m == 1)
            || (doy == em - 3 && y >= 2000)
            || (doy == em && y >= 2000)
            || (d == 1 && m == 5 && y >= 2000)
            || (d == 25 && m == 12)
            || (d == 26 && m == 12 && y >= 2000)
            || (d == 31 && m == 12 && (y == 1998 || y == 1999 || y == 2001))
        {
            return false;
        }
        true
    }
}

fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    (1..month).map(|m| days_in_month(year, m)).sum::<u32>() + day
}

/// Day of year of Easter Monday (western) via the anonymous Gregorian
/// computus.
fn easter_monday_day_of_year(year: i32) -> u32 {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31; // 3 = March, 4 = April
    let day = (h + l - 7 * m + 114) % 31 + 1;
    // Easter Monday is the day after Easter Sunday.
    day_of_year(year, month as u32, day as u32) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn null_calendar_accepts_everything() {
        let cal = NullCalendar;
        assert!(cal.is_business_day(ymd(2024, 1, 6))); // a Saturday
    }

    #[test]
    fn weekends_only() {
        let cal = WeekendsOnly;
        assert!(cal.is_business_day(ymd(2024, 1, 5))); // Friday
        assert!(!cal.is_business_day(ymd(2024, 1, 6))); // Saturday
        assert!(!cal.is_business_day(ymd(2024, 1, 7))); // Sunday
    }

    #[test]
    fn target_fixed_holidays() {
        let cal = Target;
        assert!(!cal.is_business_day(ymd(2024, 1, 1))); // New Year
        assert!(!cal.is_business_day(ymd(2024, 5, 1))); // Labour Day
        assert!(!cal.is_business_day(ymd(2024, 12, 25))); // Christmas
        assert!(!cal.is_business_day(ymd(2024, 12, 26))); // Boxing Day
        assert!(cal.is_business_day(ymd(2024, 12, 27))); // Friday after
    }

    #[test]
    fn target_easter() {
        let cal = Target;
        // 2024: Good Friday Mar 29, Easter Monday Apr 1.
        assert!(!cal.is_business_day(ymd(2024, 3, 29)));
        assert!(!cal.is_business_day(ymd(2024, 4, 1)));
        assert!(cal.is_business_day(ymd(2024, 4, 2)));
        // 2025: Good Friday Apr 18, Easter Monday Apr 21.
        assert!(!cal.is_business_day(ymd(2025, 4, 18)));
        assert!(!cal.is_business_day(ymd(2025, 4, 21)));
    }

    #[test]
    fn adjust_following_vs_preceding() {
        let cal = WeekendsOnly;
        let sat = ymd(2024, 1, 6);
        assert_eq!(
            cal.adjust(sat, BusinessDayConvention::Following),
            ymd(2024, 1, 8)
        );
        assert_eq!(
            cal.adjust(sat, BusinessDayConvention::Preceding),
            ymd(2024, 1, 5)
        );
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Unadjusted), sat);
    }

    #[test]
    fn adjust_modified_following_rolls_back_at_month_end() {
        let cal = WeekendsOnly;
        // 2024-03-30 is a Saturday; Following lands in April, so Modified
        // Following must roll back to Friday the 29th.
        let d = ymd(2024, 3, 30);
        assert_eq!(
            cal.adjust(d, BusinessDayConvention::ModifiedFollowing),
            ymd(2024, 3, 29)
        );
    }

    #[test]
    fn advance_business_days() {
        let cal = WeekendsOnly;
        // Friday + 1 business day = Monday.
        let fri = ymd(2024, 1, 5);
        assert_eq!(
            cal.advance(fri, 1, TimeUnit::Days, BusinessDayConvention::Following)
                .unwrap(),
            ymd(2024, 1, 8)
        );
        assert_eq!(
            cal.advance(fri, -5, TimeUnit::Days, BusinessDayConvention::Following)
                .unwrap(),
            ymd(2023, 12, 29)
        );
    }

    #[test]
    fn advance_months_rolls() {
        let cal = WeekendsOnly;
        // 2024-05-04 is a Saturday: one month after 2024-04-04 (Thursday)
        // must roll to Monday the 6th under Following.
        let d = ymd(2024, 4, 4);
        assert_eq!(
            cal.advance(d, 1, TimeUnit::Months, BusinessDayConvention::Following)
                .unwrap(),
            ymd(2024, 5, 6)
        );
    }

    #[test]
    fn business_days_between_counts() {
        let cal = WeekendsOnly;
        let mon = ymd(2024, 1, 8);
        let next_mon = ymd(2024, 1, 15);
        assert_eq!(cal.business_days_between(mon, next_mon), 5);
        assert_eq!(cal.business_days_between(next_mon, mon), -5);
    }
}
