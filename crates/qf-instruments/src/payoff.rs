//! Option payoffs.
//!
//! A payoff maps the underlying price at exercise to the amount received.

use qf_core::Real;
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for a call, −1 for a put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Base trait for option payoffs.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// The payoff for an underlying price at exercise.
    fn value(&self, price: Real) -> Real;

    /// Short human-readable name.
    fn name(&self) -> &str;

    /// Longer description.
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// A payoff parameterised by a strike and an option type.
pub trait StrikedPayoff: Payoff {
    /// The strike price.
    fn strike(&self) -> Real;

    /// Call or put.
    fn option_type(&self) -> OptionType;
}

/// Plain vanilla payoff `max(φ(S − K), 0)`.
#[derive(Debug, Clone)]
pub struct PlainVanillaPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
}

impl PlainVanillaPayoff {
    /// Create a plain vanilla payoff.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, price: Real) -> Real {
        (self.option_type.sign() * (price - self.strike)).max(0.0)
    }

    fn name(&self) -> &str {
        "Vanilla"
    }

    fn description(&self) -> String {
        format!("{} {} @ {}", self.name(), self.option_type, self.strike)
    }
}

impl StrikedPayoff for PlainVanillaPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }
}

/// Cash-or-nothing payoff: a fixed amount when in the money, zero otherwise.
#[derive(Debug, Clone)]
pub struct CashOrNothingPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
    /// The fixed amount paid when in the money.
    pub cash_payoff: Real,
}

impl CashOrNothingPayoff {
    /// Create a cash-or-nothing payoff.
    pub fn new(option_type: OptionType, strike: Real, cash_payoff: Real) -> Self {
        Self {
            option_type,
            strike,
            cash_payoff,
        }
    }
}

impl Payoff for CashOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if self.option_type.sign() * (price - self.strike) > 0.0 {
            self.cash_payoff
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "CashOrNothing"
    }
}

impl StrikedPayoff for CashOrNothingPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }
}
