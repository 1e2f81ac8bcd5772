//! The tridiagonal linear operator.
//!
//! Stores the three bands as [`Array`]s: `low[1..n-1]`, `diag[0..n-1]`,
//! `up[0..n-2]`. `low[0]` and `up[n-1]` are kept for row alignment and
//! never read. Application is `O(n)`, and so is solving, via the Thomas
//! forward-elimination / back-substitution sweep, which is stable for the
//! diagonally dominant systems the schemes produce.
//!
//! An operator may carry a [`TimeSetter`]: a provider that refreshes the
//! bands for a given time. Schemes query [`is_time_dependent`]
//! (`TridiagonalOperator::is_time_dependent`) to decide whether their cached
//! matrices must be rebuilt every step.

use qf_core::{
    ensure,
    errors::{Error, Result},
    Real, Size, Time,
};
use qf_math::Array;
use std::ops::{Add, Mul, Sub};
use std::sync::Arc;

/// Pivots below this magnitude make the Thomas sweep fail as singular.
const PIVOT_EPSILON: Real = 1.0e-35;

/// Refreshes an operator's bands for a given time.
pub trait TimeSetter: std::fmt::Debug + Send + Sync {
    /// Rewrite the bands of `op` for time `t`.
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator) -> Result<()>;
}

/// A linear operator on arrays of fixed size `n` with three non-zero bands.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    low: Array,
    diag: Array,
    up: Array,
    time_setter: Option<Arc<dyn TimeSetter>>,
}

impl TridiagonalOperator {
    /// Create a zero operator of size `n` (`n >= 2`).
    ///
    /// # Panics
    /// Panics when `n < 2`; operator sizes are structural, not data-driven.
    pub fn new(n: Size) -> Self {
        assert!(n >= 2, "a tridiagonal operator needs at least two rows");
        Self {
            low: Array::new(n),
            diag: Array::new(n),
            up: Array::new(n),
            time_setter: None,
        }
    }

    /// The identity operator of size `n`.
    pub fn identity(n: Size) -> Self {
        let mut op = Self::new(n);
        op.diag = Array::from_element(n, 1.0);
        op
    }

    /// Build directly from the three bands (`low[0]` and `up[n-1]` unused).
    pub fn from_bands(low: Array, diag: Array, up: Array) -> Result<Self> {
        ensure!(
            low.size() == diag.size() && up.size() == diag.size(),
            "band lengths differ: low {}, diag {}, up {}",
            low.size(),
            diag.size(),
            up.size()
        );
        ensure!(diag.size() >= 2, "a tridiagonal operator needs at least two rows");
        Ok(Self {
            low,
            diag,
            up,
            time_setter: None,
        })
    }

    /// Attach a time-dependence provider.
    pub fn with_time_setter(mut self, setter: Arc<dyn TimeSetter>) -> Self {
        self.time_setter = Some(setter);
        self
    }

    /// Number of rows (= columns).
    pub fn size(&self) -> Size {
        self.diag.size()
    }

    /// Whether a time-dependence provider is attached.
    pub fn is_time_dependent(&self) -> bool {
        self.time_setter.is_some()
    }

    /// Refresh the bands for time `t`; a no-op for constant operators.
    pub fn set_time(&mut self, t: Time) -> Result<()> {
        if let Some(setter) = self.time_setter.clone() {
            setter.set_time(t, self)?;
        }
        Ok(())
    }

    /// Overwrite the first row.
    pub fn set_first_row(&mut self, diag: Real, up: Real) {
        self.diag[0] = diag;
        self.up[0] = up;
    }

    /// Overwrite the last row.
    pub fn set_last_row(&mut self, low: Real, diag: Real) {
        let n = self.size();
        self.low[n - 1] = low;
        self.diag[n - 1] = diag;
    }

    /// Overwrite a single interior row `i` (`1 <= i <= n-2`).
    pub fn set_mid_row(&mut self, i: Size, low: Real, diag: Real, up: Real) {
        assert!(
            i >= 1 && i <= self.size() - 2,
            "row {i} is not interior (size {})",
            self.size()
        );
        self.low[i] = low;
        self.diag[i] = diag;
        self.up[i] = up;
    }

    /// Uniformly fill every interior row.
    pub fn set_mid_rows(&mut self, low: Real, diag: Real, up: Real) {
        for i in 1..self.size() - 1 {
            self.low[i] = low;
            self.diag[i] = diag;
            self.up[i] = up;
        }
    }

    /// Compute `M · a`.
    pub fn apply_to(&self, a: &Array) -> Result<Array> {
        let n = self.size();
        ensure!(
            a.size() == n,
            "cannot apply a size-{n} operator to a size-{} array",
            a.size()
        );
        let mut out = Array::new(n);
        out[0] = self.diag[0] * a[0] + self.up[0] * a[1];
        for i in 1..n - 1 {
            out[i] = self.low[i] * a[i - 1] + self.diag[i] * a[i] + self.up[i] * a[i + 1];
        }
        out[n - 1] = self.low[n - 1] * a[n - 2] + self.diag[n - 1] * a[n - 1];
        Ok(out)
    }

    /// Solve `M · x = rhs` with the Thomas algorithm.
    ///
    /// Fails with [`Error::Singular`] when a pivot falls below a fixed
    /// epsilon during the forward sweep.
    pub fn solve_for(&self, rhs: &Array) -> Result<Array> {
        let n = self.size();
        ensure!(
            rhs.size() == n,
            "cannot solve a size-{n} system for a size-{} right-hand side",
            rhs.size()
        );

        let mut c_star = vec![0.0; n];
        let mut d_star = vec![0.0; n];

        let mut pivot = self.diag[0];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(Error::Singular { row: 0 });
        }
        c_star[0] = self.up[0] / pivot;
        d_star[0] = rhs[0] / pivot;

        for i in 1..n {
            pivot = self.diag[i] - self.low[i] * c_star[i - 1];
            if pivot.abs() < PIVOT_EPSILON {
                return Err(Error::Singular { row: i });
            }
            if i < n - 1 {
                c_star[i] = self.up[i] / pivot;
            }
            d_star[i] = (rhs[i] - self.low[i] * d_star[i - 1]) / pivot;
        }

        let mut x = Array::new(n);
        x[n - 1] = d_star[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_star[i] - c_star[i] * x[i + 1];
        }
        Ok(x)
    }

    /// Overwrite `self` with `alpha · I + beta · m`, reusing the existing
    /// storage.  This is what the schemes use to refresh their cached
    /// matrices without allocating, which matters for time-dependent
    /// operators rebuilt every step.
    pub fn assign_axpy_identity(
        &mut self,
        alpha: Real,
        beta: Real,
        m: &TridiagonalOperator,
    ) -> Result<()> {
        ensure!(
            self.size() == m.size(),
            "operator size mismatch: {} vs {}",
            self.size(),
            m.size()
        );
        for i in 0..self.size() {
            self.low[i] = beta * m.low[i];
            self.diag[i] = alpha + beta * m.diag[i];
            self.up[i] = beta * m.up[i];
        }
        self.time_setter = None;
        Ok(())
    }
}

// Operator algebra. Results are plain (time-constant) operators; derived
// matrices take no part in time refresh.

impl Mul<Real> for &TridiagonalOperator {
    type Output = TridiagonalOperator;
    fn mul(self, rhs: Real) -> TridiagonalOperator {
        TridiagonalOperator {
            low: &self.low * rhs,
            diag: &self.diag * rhs,
            up: &self.up * rhs,
            time_setter: None,
        }
    }
}

impl Mul<&TridiagonalOperator> for Real {
    type Output = TridiagonalOperator;
    fn mul(self, rhs: &TridiagonalOperator) -> TridiagonalOperator {
        rhs * self
    }
}

impl Add for &TridiagonalOperator {
    type Output = TridiagonalOperator;
    fn add(self, rhs: &TridiagonalOperator) -> TridiagonalOperator {
        assert_eq!(self.size(), rhs.size(), "operator size mismatch");
        TridiagonalOperator {
            low: &self.low + &rhs.low,
            diag: &self.diag + &rhs.diag,
            up: &self.up + &rhs.up,
            time_setter: None,
        }
    }
}

impl Sub for &TridiagonalOperator {
    type Output = TridiagonalOperator;
    fn sub(self, rhs: &TridiagonalOperator) -> TridiagonalOperator {
        assert_eq!(self.size(), rhs.size(), "operator size mismatch");
        TridiagonalOperator {
            low: &self.low - &rhs.low,
            diag: &self.diag - &rhs.diag,
            up: &self.up - &rhs.up,
            time_setter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_operator() -> TridiagonalOperator {
        // A strictly diagonally dominant 5x5 operator.
        let mut op = TridiagonalOperator::new(5);
        op.set_first_row(4.0, -1.0);
        op.set_mid_rows(-1.0, 4.0, -1.0);
        op.set_last_row(-1.0, 4.0);
        op
    }

    #[test]
    fn identity_leaves_vectors_alone() {
        let id = TridiagonalOperator::identity(6);
        let v = Array::from_fn(6, |i| (i * i) as Real);
        assert_eq!(id.apply_to(&v).unwrap(), v);
        assert_eq!(id.solve_for(&v).unwrap(), v);
    }

    #[test]
    fn apply_matches_dense_product() {
        let op = sample_operator();
        let v = Array::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = op.apply_to(&v).unwrap();
        assert_eq!(out[0], 4.0 * 1.0 - 2.0);
        assert_eq!(out[2], -2.0 + 12.0 - 4.0);
        assert_eq!(out[4], -4.0 + 20.0);
    }

    #[test]
    fn solve_inverts_apply() {
        let op = sample_operator();
        let v = Array::from_slice(&[0.3, -1.2, 2.5, 0.0, 4.1]);
        let roundtrip = op.solve_for(&op.apply_to(&v).unwrap()).unwrap();
        for i in 0..5 {
            assert!(
                (roundtrip[i] - v[i]).abs() < 1e-10 * (1.0 + v[i].abs()),
                "mismatch at {i}: {} vs {}",
                roundtrip[i],
                v[i]
            );
        }
    }

    #[test]
    fn known_tridiagonal_system() {
        // A = [[2, -1, 0], [-1, 2, -1], [0, -1, 2]], x = [1, 2, 3], Ax = [0, 0, 4].
        let op = TridiagonalOperator::from_bands(
            Array::from_slice(&[0.0, -1.0, -1.0]),
            Array::from_slice(&[2.0, 2.0, 2.0]),
            Array::from_slice(&[-1.0, -1.0, 0.0]),
        )
        .unwrap();
        let x = op.solve_for(&Array::from_slice(&[0.0, 0.0, 4.0])).unwrap();
        for (got, want) in x.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn singular_pivot_is_reported() {
        let op = TridiagonalOperator::new(4); // all-zero bands
        let rhs = Array::from_element(4, 1.0);
        assert_eq!(op.solve_for(&rhs), Err(Error::Singular { row: 0 }));
    }

    #[test]
    fn size_mismatch_is_a_precondition() {
        let op = sample_operator();
        let v = Array::new(4);
        assert!(matches!(op.apply_to(&v), Err(Error::Precondition(_))));
        assert!(matches!(op.solve_for(&v), Err(Error::Precondition(_))));
    }

    #[test]
    fn scalar_scaling_law() {
        // (α·M).solve_for(v) == (1/α)·M.solve_for(v)
        let op = sample_operator();
        let v = Array::from_slice(&[1.0, 0.5, -2.0, 3.0, 1.0]);
        let alpha = 2.5;
        let scaled = &op * alpha;
        let lhs = scaled.solve_for(&v).unwrap();
        let rhs = op.solve_for(&v).unwrap() / alpha;
        for i in 0..5 {
            assert!((lhs[i] - rhs[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn addition_and_subtraction() {
        let a = sample_operator();
        let b = TridiagonalOperator::identity(5);
        let sum = &a + &b;
        let diff = &sum - &b;
        let v = Array::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let lhs = sum.apply_to(&v).unwrap();
        let expected = &a.apply_to(&v).unwrap() + &v;
        for i in 0..5 {
            assert!((lhs[i] - expected[i]).abs() < 1e-12);
            assert!((diff.apply_to(&v).unwrap()[i] - a.apply_to(&v).unwrap()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn axpy_identity_matches_fresh_combination() {
        let m = sample_operator();
        let mut cache = TridiagonalOperator::new(5);
        cache.assign_axpy_identity(1.0, -0.25, &m).unwrap();

        let direct = &TridiagonalOperator::identity(5) + &(&m * -0.25);
        let v = Array::from_slice(&[2.0, -1.0, 0.5, 3.0, 1.0]);
        let a = cache.apply_to(&v).unwrap();
        let b = direct.apply_to(&v).unwrap();
        for i in 0..5 {
            assert!((a[i] - b[i]).abs() < 1e-14);
        }
    }

    #[derive(Debug)]
    struct Scaling;

    impl TimeSetter for Scaling {
        fn set_time(&self, t: Time, op: &mut TridiagonalOperator) -> Result<()> {
            let n = op.size();
            op.set_first_row(1.0 + t, 0.0);
            for i in 1..n - 1 {
                op.set_mid_row(i, 0.0, 1.0 + t, 0.0);
            }
            op.set_last_row(0.0, 1.0 + t);
            Ok(())
        }
    }

    #[test]
    fn time_setter_refreshes_bands() {
        let mut op = TridiagonalOperator::new(4).with_time_setter(Arc::new(Scaling));
        assert!(op.is_time_dependent());
        op.set_time(1.0).unwrap();
        let v = Array::from_element(4, 1.0);
        let out = op.apply_to(&v).unwrap();
        for i in 0..4 {
            assert!((out[i] - 2.0).abs() < 1e-15);
        }
    }

    proptest! {
        /// solve_for(apply_to(v)) ≈ v for random diagonally dominant
        /// operators and random vectors.
        #[test]
        fn prop_solve_inverts_apply(
            n in 3usize..40,
            seed in proptest::collection::vec(-1.0f64..1.0, 3 * 40 + 40),
        ) {
            let mut op = TridiagonalOperator::new(n);
            for i in 0..n {
                let low = if i > 0 { seed[3 * i] } else { 0.0 };
                let up = if i < n - 1 { seed[3 * i + 1] } else { 0.0 };
                // Dominant diagonal keeps the sweep well-conditioned.
                let diag = 3.0 + seed[3 * i + 2];
                if i == 0 {
                    op.set_first_row(diag, up);
                } else if i == n - 1 {
                    op.set_last_row(low, diag);
                } else {
                    op.set_mid_row(i, low, diag, up);
                }
            }
            let v = Array::from_fn(n, |i| seed[3 * 40 + i]);
            let roundtrip = op.solve_for(&op.apply_to(&v).unwrap()).unwrap();
            for i in 0..n {
                prop_assert!((roundtrip[i] - v[i]).abs() < 1e-10);
            }
        }
    }
}
