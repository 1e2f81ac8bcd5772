//! Business-day rolling conventions.

/// How a non-business day is rolled onto a business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessDayConvention {
    /// Roll forward to the next business day.
    Following,
    /// Roll forward, unless that crosses a month end; then roll backward.
    ModifiedFollowing,
    /// Roll backward to the previous business day.
    Preceding,
    /// Roll backward, unless that crosses a month start; then roll forward.
    ModifiedPreceding,
    /// Leave the date as it is.
    Unadjusted,
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
            BusinessDayConvention::Unadjusted => "Unadjusted",
        };
        write!(f, "{name}")
    }
}
