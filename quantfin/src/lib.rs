//! # quantfin
//!
//! A derivative-pricing library built around a composable finite-difference
//! PDE engine.
//!
//! This crate is a façade that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `qf-*` members.
//!
//! ## Quick start
//!
//! ```
//! use quantfin::instruments::{OptionType, VanillaOption};
//! use quantfin::pricingengines::FdEuropeanEngine;
//! use quantfin::processes::GeneralizedBlackScholesProcess;
//! use quantfin::quotes::SimpleQuote;
//! use quantfin::termstructures::{BlackConstantVol, FlatForward};
//! use quantfin::time::Date;
//! use std::sync::Arc;
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let expiry = Date::from_ymd(2026, 1, 2).unwrap();
//!
//! let process = Arc::new(GeneralizedBlackScholesProcess::new(
//!     Arc::new(SimpleQuote::new(100.0)),
//!     Arc::new(FlatForward::act365(today, 0.05)),
//!     Arc::new(FlatForward::act365(today, 0.0)),
//!     Arc::new(BlackConstantVol::act365(today, 0.20)),
//! ));
//! let engine = FdEuropeanEngine::with_resolution(process, 101, 100);
//! let option = VanillaOption::european(OptionType::Call, 100.0, expiry);
//!
//! let results = option.price(&engine).unwrap();
//! assert!((results.npv - 10.45).abs() < 0.05);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use qf_core as core;

/// Dates, calendars, and day counters.
pub use qf_time as time;

/// Arrays, interpolation, distributions, and solvers.
pub use qf_math as math;

/// Market quotes.
pub use qf_quotes as quotes;

/// Yield and volatility term structures.
pub use qf_termstructures as termstructures;

/// Stochastic process definitions.
pub use qf_processes as processes;

/// Financial instruments.
pub use qf_instruments as instruments;

/// Numerical methods: the finite-difference PDE framework.
pub use qf_methods as methods;

/// Pricing engines.
pub use qf_pricingengines as pricingengines;
