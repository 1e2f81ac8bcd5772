//! 1-D interpolation.
//!
//! Linear interpolation is what the dividend step condition uses to shift a
//! solution vector along the asset grid; the natural cubic spline is kept for
//! smoother re-sampling of curves and surfaces.

use qf_core::{ensure, errors::Result, Real};

/// A 1-D interpolation `f: R → R` through a set of known points.
///
/// Evaluation outside `[x_min, x_max]` extrapolates from the nearest
/// segment.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn value(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Whether `x` lies inside the domain.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Locate the segment index `i` such that `xs[i] <= x < xs[i+1]`,
/// clamped to `[0, n-2]`.
fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // partition_point returns the first index with xs[i] > x.
    xs.partition_point(|&xi| xi <= x) - 1
}

fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points, got {}",
        xs.len()
    );
    ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "interpolation nodes must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Piecewise-linear interpolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Build from strictly increasing `xs` and matching `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        *self.xs.last().expect("at least two nodes")
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let slope = (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]);
        self.ys[i] + slope * (x - self.xs[i])
    }
}

// ── Natural cubic spline ──────────────────────────────────────────────────────

/// Natural cubic spline (second derivative vanishing at both ends).
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivatives at the knots.
    m: Vec<Real>,
}

impl NaturalCubicSpline {
    /// Build a natural cubic spline through `(xs[i], ys[i])`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 3)?;
        let m = second_derivatives(xs, ys);
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }
}

/// Solve the natural-spline tridiagonal system for the knot second
/// derivatives with a single forward sweep and back substitution.
fn second_derivatives(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    for i in 1..n - 1 {
        let rhs = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        let denom = 2.0 * (h[i - 1] + h[i]) - h[i - 1] * c_prime[i - 1];
        c_prime[i] = h[i] / denom;
        d_prime[i] = (rhs - h[i - 1] * d_prime[i - 1]) / denom;
    }

    let mut m = vec![0.0; n];
    for i in (1..n - 1).rev() {
        m[i] = d_prime[i] - c_prime[i] * m[i + 1];
    }
    m
}

impl Interpolation1D for NaturalCubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        *self.xs.last().expect("at least three nodes")
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = x - self.xs[i];
        let a = (self.m[i + 1] - self.m[i]) / (6.0 * h);
        let b = self.m[i] / 2.0;
        let c = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        self.ys[i] + t * (c + t * (b + t * a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_between_and_beyond() {
        let f = LinearInterpolation::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!((f.value(0.5) - 0.5).abs() < 1e-12);
        assert!((f.value(1.5) - 2.5).abs() < 1e-12);
        // Extrapolation continues the end segments.
        assert!((f.value(-1.0) + 1.0).abs() < 1e-12);
        assert!((f.value(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn linear_hits_nodes() {
        let xs = [0.0, 0.3, 1.1, 2.0];
        let ys = [1.0, -0.5, 2.0, 0.0];
        let f = LinearInterpolation::new(&xs, &ys).unwrap();
        for i in 0..xs.len() {
            assert!((f.value(xs[i]) - ys[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_bad_nodes() {
        assert!(LinearInterpolation::new(&[0.0], &[1.0]).is_err());
        assert!(LinearInterpolation::new(&[0.0, 1.0], &[1.0]).is_err());
        assert!(LinearInterpolation::new(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn spline_passes_through_nodes() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 0.5, 2.0, 1.5];
        let s = NaturalCubicSpline::new(&xs, &ys).unwrap();
        for i in 0..xs.len() {
            assert!((s.value(xs[i]) - ys[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn spline_close_to_smooth_function() {
        let xs: Vec<Real> = (0..=20).map(|i| -2.0 + 0.2 * i as Real).collect();
        let ys: Vec<Real> = xs.iter().map(|&x| (-x * x).exp()).collect();
        let s = NaturalCubicSpline::new(&xs, &ys).unwrap();
        for &x in &[-1.5, -0.7, 0.1, 0.9, 1.3] {
            let err = (s.value(x) - (-(x * x)).exp()).abs();
            assert!(err < 1e-3, "spline error {err:.2e} at x={x}");
        }
    }
}
