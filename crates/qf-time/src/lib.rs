//! # qf-time
//!
//! Dates, business-day calendars, and day-count conventions for quantfin.
//!
//! These types are the date-level collaborators of the pricing engines:
//! a [`DayCounter`] turns a pair of [`Date`]s into a year fraction, and a
//! [`Calendar`] answers business-day questions and rolls dates according to a
//! [`BusinessDayConvention`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod business_day_convention;
mod calendar;
mod date;
mod day_counter;
mod time_unit;
mod weekday;

pub use business_day_convention::BusinessDayConvention;
pub use calendar::{Calendar, NullCalendar, Target, WeekendsOnly};
pub use date::Date;
pub use day_counter::{Actual360, Actual365Fixed, DayCounter, Thirty360};
pub use time_unit::TimeUnit;
pub use weekday::Weekday;
