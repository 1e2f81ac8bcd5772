//! # qf-pricingengines
//!
//! Pricing engines for vanilla options: the closed-form
//! Black–Scholes–Merton engine, implied-volatility inversion, and the
//! finite-difference family built on `qf-methods` (European, American,
//! shout, and discrete-dividend variants), all reporting NPV and greeks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod analytic_european_engine;
mod fd_dividend_engines;
mod fd_stepcondition_engines;
mod fd_vanilla_engine;
mod implied_volatility;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine};
pub use fd_dividend_engines::{FdDividendAmericanEngine, FdDividendEuropeanEngine};
pub use fd_stepcondition_engines::{FdAmericanEngine, FdShoutEngine};
pub use fd_vanilla_engine::FdEuropeanEngine;
pub use implied_volatility::implied_volatility;
