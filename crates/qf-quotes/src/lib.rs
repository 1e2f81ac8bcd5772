//! # qf-quotes
//!
//! Market quotes — the live scalar inputs to pricing.
//!
//! A [`Quote`] exposes a current value and a monotonic version. Engines cache
//! results against the version they priced with and recompute when it has
//! moved; there is no callback registration.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod quote;

pub use quote::{Quote, SimpleQuote};
