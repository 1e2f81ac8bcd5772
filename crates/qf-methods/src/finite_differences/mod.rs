//! Finite-difference methods for PDE-based option pricing.
//!
//! The framework decomposes into small cooperating pieces:
//!
//! * [`TridiagonalOperator`] — a linear operator with three non-zero bands,
//!   supporting `apply_to`, `solve_for` (Thomas elimination), scalar algebra,
//!   and a hook for time-dependent coefficients;
//! * [`BoundaryCondition`] — Neumann / Dirichlet row modifiers imposed on the
//!   operator and solution vector at the grid ends;
//! * [`bsm_operator`] — the Black–Scholes differential operator discretised
//!   on a log-price grid;
//! * [`MixedScheme`] — the θ-scheme evolver, with
//!   [`forward_euler`] (θ = 0), [`backward_euler`] (θ = 1), and
//!   [`crank_nicolson`] (θ = ½) constructors;
//! * [`StepCondition`] — in-place transformations applied to the solution
//!   between steps (early exercise, shout, dividend jumps);
//! * [`FiniteDifferenceModel`] — the rollback driver walking time backward,
//!   stopping exactly at prescribed times.
//!
//! The evolver knows nothing about Black–Scholes and the driver knows
//! nothing about either; any linear operator and any scheme combine.

mod boundary_condition;
mod bsm_operator;
mod evolution_scheme;
mod grid;
mod model;
mod step_condition;
mod tridiagonal_operator;

pub use boundary_condition::{BoundaryCondition, Side};
pub use bsm_operator::{bsm_operator, bsm_time_dependent_operator};
pub use evolution_scheme::{
    backward_euler, crank_nicolson, forward_euler, EvolutionScheme, MixedScheme,
};
pub use grid::{asset_grid, bounded_log_grid};
pub use model::FiniteDifferenceModel;
pub use step_condition::{
    AmericanCondition, DividendCondition, NullCondition, ShoutCondition, StepCondition,
    StepConditionSet,
};
pub use tridiagonal_operator::{TimeSetter, TridiagonalOperator};
