//! `Quote` trait and `SimpleQuote` implementation.

use qf_core::{Real, VersionCounter};
use std::sync::Mutex;

/// A market-observable value.
pub trait Quote: std::fmt::Debug + Send + Sync {
    /// The current value, or `None` while the quote is unset.
    fn value(&self) -> Option<Real>;

    /// Whether the quote currently holds a value.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// Monotonic change counter; bumps on every mutation.
    ///
    /// Immutable quotes may leave the default, which reports a constant.
    fn version(&self) -> u64 {
        0
    }
}

/// A simple, settable market quote.
///
/// Interior mutability lets a quote shared behind `Arc` be re-marked while
/// engines hold references to it; every mutation bumps the version counter
/// so that cached results go stale.
#[derive(Debug)]
pub struct SimpleQuote {
    value: Mutex<Option<Real>>,
    version: VersionCounter,
}

impl SimpleQuote {
    /// Create a quote with the given value.
    pub fn new(value: Real) -> Self {
        Self {
            value: Mutex::new(Some(value)),
            version: VersionCounter::new(),
        }
    }

    /// Create an empty (invalid) quote.
    pub fn empty() -> Self {
        Self {
            value: Mutex::new(None),
            version: VersionCounter::new(),
        }
    }

    /// Set a new value, invalidating dependent caches.
    pub fn set_value(&self, value: Real) {
        *self.value.lock().expect("quote lock poisoned") = Some(value);
        self.version.bump();
    }

    /// Clear the value, making the quote invalid.
    pub fn reset(&self) {
        *self.value.lock().expect("quote lock poisoned") = None;
        self.version.bump();
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<Real> {
        *self.value.lock().expect("quote lock poisoned")
    }

    fn version(&self) -> u64 {
        self.version.current()
    }
}
