//! Units for date arithmetic.

/// Units of time used by [`Date::advance`](crate::Date::advance) and
/// [`Calendar::advance`](crate::Calendar::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Weeks (7 calendar days).
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Years => "years",
        };
        write!(f, "{name}")
    }
}
