//! Time-stepping schemes.
//!
//! All three classic schemes are one θ-scheme: a step of `Δt` applies the
//! explicit part `I − (1−θ)·Δt·D` and then solves the implicit part
//! `I + θ·Δt·D`.  θ = 0 is forward Euler (cheap, conditionally stable),
//! θ = 1 backward Euler (unconditionally stable, first order in time), and
//! θ = ½ Crank–Nicolson (second order in time, may oscillate near kinked
//! payoffs unless preceded by a few implicit steps).
//!
//! The two part matrices are cached and rebuilt only when the step changes
//! or when the operator reports time dependence.  Boundary conditions are
//! imposed in a fixed order within every step: operator rows before the
//! apply/solve, vector entries after.

use crate::finite_differences::boundary_condition::BoundaryCondition;
use crate::finite_differences::tridiagonal_operator::TridiagonalOperator;
use qf_core::{ensure, errors::Result, Real, Time};
use qf_math::Array;

/// A step of `Δt` below this threshold is treated as zero and skipped;
/// rollback sub-steps degenerate to this when a stopping time coincides
/// with a step boundary.
const ZERO_STEP: Time = 1.0e-12;

/// Strategy interface: advance the solution one step backward in time.
pub trait EvolutionScheme: std::fmt::Debug {
    /// Set the step length used by subsequent [`step`](Self::step) calls.
    fn set_step(&mut self, dt: Time) -> Result<()>;

    /// Advance `a` from `t` to `t − Δt` in place.
    fn step(&mut self, a: &mut Array, t: Time) -> Result<()>;
}

/// The θ-scheme evolver over a [`TridiagonalOperator`].
#[derive(Debug)]
pub struct MixedScheme {
    op: TridiagonalOperator,
    theta: Real,
    dt: Time,
    explicit_part: Option<TridiagonalOperator>,
    implicit_part: Option<TridiagonalOperator>,
    bcs: Vec<BoundaryCondition>,
}

impl MixedScheme {
    /// Wrap `op` in a θ-scheme with the given boundary conditions.
    pub fn new(op: TridiagonalOperator, theta: Real, bcs: Vec<BoundaryCondition>) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&theta),
            "theta must lie in [0, 1], got {theta}"
        );
        Ok(Self {
            op,
            theta,
            dt: 0.0,
            explicit_part: None,
            implicit_part: None,
            bcs,
        })
    }

    /// The wrapped operator.
    pub fn operator(&self) -> &TridiagonalOperator {
        &self.op
    }

    /// The scheme's θ.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Rebuild the cached part matrices for the current step, reusing their
    /// storage after the first build.
    fn refresh(&mut self) -> Result<()> {
        let n = self.op.size();
        if self.theta < 1.0 {
            let part = self
                .explicit_part
                .get_or_insert_with(|| TridiagonalOperator::new(n));
            part.assign_axpy_identity(1.0, -(1.0 - self.theta) * self.dt, &self.op)?;
        }
        if self.theta > 0.0 {
            let part = self
                .implicit_part
                .get_or_insert_with(|| TridiagonalOperator::new(n));
            part.assign_axpy_identity(1.0, self.theta * self.dt, &self.op)?;
        }
        Ok(())
    }
}

impl EvolutionScheme for MixedScheme {
    fn set_step(&mut self, dt: Time) -> Result<()> {
        ensure!(dt >= 0.0, "step length must not be negative, got {dt}");
        self.dt = dt;
        if dt > ZERO_STEP {
            self.refresh()?;
        }
        Ok(())
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        ensure!(
            a.size() == self.op.size(),
            "solution vector of size {} does not match operator of size {}",
            a.size(),
            self.op.size()
        );
        if self.dt <= ZERO_STEP {
            // Zero-length step: leave the solution untouched.
            return Ok(());
        }
        if self.op.is_time_dependent() {
            self.op.set_time(t)?;
            self.refresh()?;
        }

        if self.theta < 1.0 {
            let part = self.explicit_part.as_mut().expect("refreshed on set_step");
            for bc in &self.bcs {
                bc.apply_before_applying(part);
            }
            *a = part.apply_to(a)?;
            for bc in &self.bcs {
                bc.apply_after_applying(a);
            }
        }
        if self.theta > 0.0 {
            let part = self.implicit_part.as_mut().expect("refreshed on set_step");
            for bc in &self.bcs {
                bc.apply_before_solving(part, a);
            }
            *a = part.solve_for(a)?;
            for bc in &self.bcs {
                bc.apply_after_solving(a);
            }
        }
        Ok(())
    }
}

/// Forward Euler: explicit, θ = 0.
pub fn forward_euler(
    op: TridiagonalOperator,
    bcs: Vec<BoundaryCondition>,
) -> Result<MixedScheme> {
    MixedScheme::new(op, 0.0, bcs)
}

/// Backward Euler: fully implicit, θ = 1.
pub fn backward_euler(
    op: TridiagonalOperator,
    bcs: Vec<BoundaryCondition>,
) -> Result<MixedScheme> {
    MixedScheme::new(op, 1.0, bcs)
}

/// Crank–Nicolson: θ = ½.
pub fn crank_nicolson(
    op: TridiagonalOperator,
    bcs: Vec<BoundaryCondition>,
) -> Result<MixedScheme> {
    MixedScheme::new(op, 0.5, bcs)
}
