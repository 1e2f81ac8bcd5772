//! # qf-instruments
//!
//! Financial instrument definitions: payoffs, exercise schedules, vanilla
//! and dividend-carrying options, and the pricing-engine interface they are
//! priced through.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod exercise;
mod instrument;
mod option;
mod payoff;

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{Instrument, PricingEngine, PricingResults};
pub use option::{DividendVanillaOption, DividendVanillaOptionArguments, VanillaOption, VanillaOptionArguments};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
