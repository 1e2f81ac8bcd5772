//! Error types for quantfin.
//!
//! A single `thiserror`-derived enum covers the whole library. The numerical
//! core surfaces everything to the caller immediately; nothing is silently
//! recovered. The `ensure!` and `fail!` macros are the usual shorthand for
//! guarding preconditions and bailing out.

use thiserror::Error;

/// The top-level error type used throughout quantfin.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated: size mismatches, non-monotone grids,
    /// rollback called with `from < to`, and the like.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// A zero (sub-epsilon) pivot was hit during tridiagonal elimination.
    #[error("singular tridiagonal system: zero pivot at row {row}")]
    Singular {
        /// Row at which the forward sweep broke down.
        row: usize,
    },

    /// A non-finite entry appeared in a solution vector.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// A term structure was evaluated outside its domain without
    /// extrapolation enabled.
    #[error("time {t} out of range [0, {max}] and extrapolation is disabled")]
    OutOfRange {
        /// The requested time.
        t: f64,
        /// The largest time the structure covers.
        max: f64,
    },

    /// An operation was requested with an unsupported combination of inputs.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An operation was requested on a null / unset value.
    #[error("null value")]
    NullValue,
}

/// Shorthand `Result` type used throughout quantfin.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Guard a precondition; returns `Err(Error::Precondition(...))` when
/// `$cond` is false.
///
/// # Example
/// ```
/// use qf_core::ensure;
/// fn positive(x: f64) -> qf_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Bail out with `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use qf_core::fail;
/// fn always_err() -> qf_core::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_even(n: usize) -> Result<usize> {
        crate::ensure!(n % 2 == 0, "n must be even, got {n}");
        Ok(n / 2)
    }

    #[test]
    fn ensure_passes_and_fails() {
        assert_eq!(needs_even(4), Ok(2));
        assert!(matches!(needs_even(3), Err(Error::Precondition(_))));
    }

    #[test]
    fn error_messages() {
        let e = Error::Singular { row: 3 };
        assert_eq!(
            e.to_string(),
            "singular tridiagonal system: zero pivot at row 3"
        );
        let e = Error::OutOfRange { t: 2.0, max: 1.0 };
        assert!(e.to_string().contains("extrapolation is disabled"));
    }
}
