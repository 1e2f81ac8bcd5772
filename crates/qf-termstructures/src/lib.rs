//! # qf-termstructures
//!
//! Yield and volatility term structures — the curve-level collaborators of
//! the pricing engines.
//!
//! A [`YieldTermStructure`] provides discount factors, zero rates, and
//! forward rates; evaluation beyond the curve's maximum time fails with
//! `OutOfRange` unless extrapolation is enabled. A
//! [`BlackVolTermStructure`] provides Black volatilities by time and strike.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod black_vol;
mod flat_forward;
mod term_structure;
mod yield_term_structure;
mod zero_curve;

pub use black_vol::{BlackConstantVol, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
pub use zero_curve::ZeroCurve;
