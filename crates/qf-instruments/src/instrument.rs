//! The instrument and pricing-engine interface.

use qf_core::{errors::Result, Real};
use qf_time::Date;
use std::collections::HashMap;

/// Results of pricing an instrument: the NPV plus named extras (greeks,
/// error estimates).
#[derive(Debug, Clone, Default)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Statistical error estimate, where the engine provides one.
    pub error_estimate: Option<Real>,
    /// Additional named results such as `"delta"` or `"gamma"`.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Results holding just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            additional_results: HashMap::new(),
        }
    }

    /// Attach a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

/// A pricing engine for instruments described by `Args`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

/// Base trait for financial instruments.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// Whether the instrument is past its last relevant date.
    fn is_expired(&self, evaluation_date: Date) -> bool;

    /// The maturity or last relevant date, when one exists.
    fn maturity_date(&self) -> Option<Date> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_result("delta", 0.55)
            .with_result("gamma", 0.02);
        assert_eq!(r.npv, 42.0);
        assert_eq!(r.result("delta"), Some(0.55));
        assert_eq!(r.result("vega"), None);
    }
}
