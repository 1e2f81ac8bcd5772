//! Vanilla options and their dividend-carrying variant.

use crate::exercise::Exercise;
use crate::instrument::{Instrument, PricingEngine, PricingResults};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use qf_core::{ensure, errors::Result, Real, Time};
use qf_time::Date;
use std::sync::Arc;

/// Arguments handed to a vanilla-option pricing engine.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise schedule.
    pub exercise: Exercise,
}

/// A plain vanilla option on a single underlying.
#[derive(Debug)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
}

impl VanillaOption {
    /// Create a vanilla option from payoff and exercise.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience constructor for a European call/put.
    pub fn european(option_type: OptionType, strike: Real, expiry: Date) -> Self {
        Self {
            payoff: Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise: Exercise::european(expiry),
        }
    }

    /// Convenience constructor for an American call/put exercisable from
    /// `earliest`.
    pub fn american(option_type: OptionType, strike: Real, earliest: Date, expiry: Date) -> Self {
        Self {
            payoff: Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise: Exercise::american(earliest, expiry),
        }
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.payoff
    }

    /// The exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Bundle the engine arguments.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
        }
    }

    /// Price with the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

impl Instrument for VanillaOption {
    fn is_expired(&self, evaluation_date: Date) -> bool {
        self.exercise.last_date() < evaluation_date
    }

    fn maturity_date(&self) -> Option<Date> {
        Some(self.exercise.last_date())
    }
}

/// Arguments for a vanilla option with discrete cash dividends.
#[derive(Debug, Clone)]
pub struct DividendVanillaOptionArguments {
    /// The underlying vanilla arguments.
    pub vanilla: VanillaOptionArguments,
    /// Cash dividend amounts, parallel to `ex_div_times`.
    pub dividends: Vec<Real>,
    /// Ex-dividend instants as year fractions from the valuation date,
    /// strictly increasing.
    pub ex_div_times: Vec<Time>,
}

/// A vanilla option whose underlying pays discrete cash dividends at known
/// times.
#[derive(Debug)]
pub struct DividendVanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    dividends: Vec<Real>,
    ex_div_times: Vec<Time>,
}

impl DividendVanillaOption {
    /// Create a dividend-carrying option.
    ///
    /// `dividends[i]` is paid at year fraction `ex_div_times[i]`; the times
    /// must be strictly increasing and positive.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        dividends: Vec<Real>,
        ex_div_times: Vec<Time>,
    ) -> Result<Self> {
        ensure!(
            dividends.len() == ex_div_times.len(),
            "{} dividends but {} ex-dividend times",
            dividends.len(),
            ex_div_times.len()
        );
        ensure!(
            ex_div_times.windows(2).all(|w| w[0] < w[1]),
            "ex-dividend times must be strictly increasing"
        );
        ensure!(
            ex_div_times.first().map_or(true, |&t| t > 0.0),
            "ex-dividend times must be positive"
        );
        Ok(Self {
            payoff,
            exercise,
            dividends,
            ex_div_times,
        })
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The dividend amounts.
    pub fn dividends(&self) -> &[Real] {
        &self.dividends
    }

    /// The ex-dividend year fractions.
    pub fn ex_div_times(&self) -> &[Time] {
        &self.ex_div_times
    }

    /// Bundle the engine arguments.
    pub fn arguments(&self) -> DividendVanillaOptionArguments {
        DividendVanillaOptionArguments {
            vanilla: VanillaOptionArguments {
                payoff: Arc::clone(&self.payoff),
                exercise: self.exercise.clone(),
            },
            dividends: self.dividends.clone(),
            ex_div_times: self.ex_div_times.clone(),
        }
    }

    /// Price with the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<DividendVanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

impl Instrument for DividendVanillaOption {
    fn is_expired(&self, evaluation_date: Date) -> bool {
        self.exercise.last_date() < evaluation_date
    }

    fn maturity_date(&self) -> Option<Date> {
        Some(self.exercise.last_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseType;

    #[test]
    fn european_construction() {
        let expiry = Date::from_ymd(2026, 6, 15).unwrap();
        let opt = VanillaOption::european(OptionType::Call, 100.0, expiry);
        assert_eq!(opt.strike(), 100.0);
        assert_eq!(opt.option_type(), OptionType::Call);
        assert_eq!(opt.exercise().exercise_type(), ExerciseType::European);
        assert!(!opt.is_expired(Date::from_ymd(2026, 6, 15).unwrap()));
        assert!(opt.is_expired(Date::from_ymd(2026, 6, 16).unwrap()));
    }

    #[test]
    fn dividend_option_validation() {
        let expiry = Date::from_ymd(2026, 6, 15).unwrap();
        let payoff: Arc<dyn StrikedPayoff> =
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));

        let ok = DividendVanillaOption::new(
            Arc::clone(&payoff),
            Exercise::european(expiry),
            vec![2.0, 2.0],
            vec![0.25, 0.75],
        );
        assert!(ok.is_ok());

        let unsorted = DividendVanillaOption::new(
            Arc::clone(&payoff),
            Exercise::european(expiry),
            vec![2.0, 2.0],
            vec![0.75, 0.25],
        );
        assert!(unsorted.is_err());

        let mismatched = DividendVanillaOption::new(
            payoff,
            Exercise::european(expiry),
            vec![2.0],
            vec![0.25, 0.75],
        );
        assert!(mismatched.is_err());
    }
}
