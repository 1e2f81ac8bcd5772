//! # qf-math
//!
//! Mathematical utilities for quantfin: the [`Array`] vector type the PDE
//! machinery works on, 1-D interpolation, the normal distribution, float
//! comparison helpers, and 1-D root solvers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod array;
pub mod comparison;
pub mod interpolation;
pub mod normal;
pub mod solvers1d;

pub use array::Array;
pub use comparison::{close, close_enough};
pub use interpolation::{Interpolation1D, LinearInterpolation, NaturalCubicSpline};
pub use normal::{normal_cdf, normal_pdf};
