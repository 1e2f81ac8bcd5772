//! # qf-methods
//!
//! Numerical methods for quantfin. The heart of the crate is the
//! [`finite_differences`] module: a composable framework that solves the
//! Black–Scholes parabolic PDE on a one-dimensional grid under pluggable
//! time-stepping schemes, with per-step exercise-style conditions and
//! rollback over a schedule of stopping times.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod finite_differences;

pub use finite_differences::{
    asset_grid, backward_euler, bounded_log_grid, bsm_operator, bsm_time_dependent_operator,
    crank_nicolson, forward_euler, AmericanCondition, BoundaryCondition, DividendCondition,
    EvolutionScheme, FiniteDifferenceModel, MixedScheme, NullCondition, ShoutCondition, Side,
    StepCondition, StepConditionSet, TimeSetter, TridiagonalOperator,
};
