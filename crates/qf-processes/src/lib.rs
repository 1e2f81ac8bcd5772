//! # qf-processes
//!
//! Stochastic process descriptions. Here a process is the bundle of market
//! data a pricing engine consumes: the spot quote, the risk-free and
//! dividend curves, and the Black volatility surface.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod black_scholes_process;

pub use black_scholes_process::GeneralizedBlackScholesProcess;
