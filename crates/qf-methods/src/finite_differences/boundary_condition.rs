//! Boundary conditions for the 1-D differential operators.
//!
//! A boundary condition owns one end of the grid and exposes four in-place
//! mutators: a pair for the explicit path (`apply_before_applying` on the
//! operator, `apply_after_applying` on the result vector) and a pair for the
//! implicit path (`apply_before_solving` on operator and right-hand side,
//! `apply_after_solving` on the solution). Conditions at opposite ends
//! touch disjoint rows, so applying left-then-right and right-then-left
//! agree.

use crate::finite_differences::tridiagonal_operator::TridiagonalOperator;
use qf_core::Real;
use qf_math::Array;

/// Which end of the grid a condition is imposed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The first grid node.
    Lower,
    /// The last grid node.
    Upper,
}

/// A boundary condition on one end of the grid.
///
/// The Neumann value is the first difference across the boundary cell,
/// i.e. the prescribed derivative already multiplied by the local grid
/// step.  With the value taken from the payoff slope this collapses the
/// boundary row to `(−1, +1)` — the zero-curvature condition.
#[derive(Debug, Clone, Copy)]
pub enum BoundaryCondition {
    /// Fix the first difference `u[1] − u[0]` (lower) or
    /// `u[n−1] − u[n−2]` (upper) to `value`.
    Neumann {
        /// End of the grid the condition owns.
        side: Side,
        /// The prescribed first difference.
        value: Real,
    },
    /// Pin the boundary node to `value`.
    Dirichlet {
        /// End of the grid the condition owns.
        side: Side,
        /// The prescribed node value.
        value: Real,
    },
    /// Leave the boundary rows as the operator built them.
    None,
}

impl BoundaryCondition {
    /// Rewrite the boundary row before `apply_to`.
    pub fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        match *self {
            BoundaryCondition::Neumann { side, .. } => match side {
                Side::Lower => op.set_first_row(-1.0, 1.0),
                Side::Upper => op.set_last_row(-1.0, 1.0),
            },
            BoundaryCondition::Dirichlet { side, .. } => match side {
                Side::Lower => op.set_first_row(1.0, 0.0),
                Side::Upper => op.set_last_row(0.0, 1.0),
            },
            BoundaryCondition::None => {}
        }
    }

    /// Fix the boundary entry of the result after `apply_to`.
    pub fn apply_after_applying(&self, a: &mut Array) {
        let n = a.size();
        match *self {
            BoundaryCondition::Neumann { side, value } => match side {
                Side::Lower => a[0] = a[1] - value,
                Side::Upper => a[n - 1] = a[n - 2] + value,
            },
            BoundaryCondition::Dirichlet { side, value } => match side {
                Side::Lower => a[0] = value,
                Side::Upper => a[n - 1] = value,
            },
            BoundaryCondition::None => {}
        }
    }

    /// Rewrite the boundary row and the right-hand side before `solve_for`.
    pub fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut Array) {
        let n = rhs.size();
        match *self {
            BoundaryCondition::Neumann { side, value } => match side {
                Side::Lower => {
                    op.set_first_row(-1.0, 1.0);
                    rhs[0] = value;
                }
                Side::Upper => {
                    op.set_last_row(-1.0, 1.0);
                    rhs[n - 1] = value;
                }
            },
            BoundaryCondition::Dirichlet { side, value } => match side {
                Side::Lower => {
                    op.set_first_row(1.0, 0.0);
                    rhs[0] = value;
                }
                Side::Upper => {
                    op.set_last_row(0.0, 1.0);
                    rhs[n - 1] = value;
                }
            },
            BoundaryCondition::None => {}
        }
    }

    /// Fix the solution after `solve_for`.  The row rewrite already encodes
    /// both conditions, so nothing is left to do.
    pub fn apply_after_solving(&self, _a: &mut Array) {}
}
