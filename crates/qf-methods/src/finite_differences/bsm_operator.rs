//! The discretised Black–Scholes differential operator.
//!
//! In log-price coordinates `x = ln S` the Black–Scholes PDE reads
//!
//! ```text
//! ∂V/∂t + ½σ²·∂²V/∂x² + (r − q − ½σ²)·∂V/∂x − r·V = 0
//! ```
//!
//! The operator built here is `D` such that `∂V/∂t = D·V`; the schemes then
//! advance with `I − Δt·D` (explicit) and `I + Δt·D` (implicit).  On a
//! uniform grid the interior stencil is the standard second-order centred
//! one; on a non-uniform grid the variable-step three-point formulas are
//! used, which reduce to the former when the steps agree.
//!
//! The drift weight of each row is fitted so that the row is exact on the
//! price vector itself: `D·e^x = q·e^x` holds to machine precision, not
//! just to `O(Δx²)`.  Two invariants pin the interior rows down exactly:
//! `D·1 = r` (row sums) and `D·e^x = q·e^x` (discrete forward drift); the
//! latter is what keeps discrete put–call parity at the 1e-6 level the
//! engines promise.
//!
//! Boundary rows are left untouched — boundary conditions own them.

use crate::finite_differences::grid::check_grid;
use crate::finite_differences::tridiagonal_operator::{TimeSetter, TridiagonalOperator};
use qf_core::{errors::Result, Rate, Real, Spread, Time, Volatility};
use qf_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Interior-row coefficients at node `i` for local steps `h₋`, `h₊`.
///
/// The diffusion weight is the classical three-point one; the drift weight
/// is fitted so the whole row reproduces the exponential mode exactly.
/// Both derivative stencils have zero row sums, so their symbols on `e^x`
/// reduce to `expm1` combinations and evaluate without cancellation.
fn stencil(h_minus: Real, h_plus: Real, r: Rate, q: Spread, sigma: Volatility) -> (Real, Real, Real) {
    let a = 0.5 * sigma * sigma;
    let b = r - q - 0.5 * sigma * sigma;
    let sum = h_minus + h_plus;

    // Symbols of the second- and first-derivative stencils on e^x,
    // relative to the centre node.
    let em_down = (-h_minus).exp_m1();
    let em_up = h_plus.exp_m1();
    let g2 = 2.0 * em_down / (h_minus * sum) + 2.0 * em_up / (h_plus * sum);
    let g1 = -h_plus * em_down / (h_minus * sum) + h_minus * em_up / (h_plus * sum);
    // a·g2 + b̃·g1 = a + b, so that D·e^x = (r − a − b)·e^x = q·e^x.
    let b = (a + b - a * g2) / g1;

    let low = -(2.0 * a - b * h_plus) / (h_minus * sum);
    let diag = (2.0 * a - b * (h_plus - h_minus)) / (h_minus * h_plus) + r;
    let up = -(2.0 * a + b * h_minus) / (h_plus * sum);
    (low, diag, up)
}

fn fill_rows(
    op: &mut TridiagonalOperator,
    grid: &[Real],
    mut coeffs: impl FnMut(usize) -> Result<(Rate, Spread, Volatility)>,
) -> Result<()> {
    for i in 1..grid.len() - 1 {
        let (r, q, sigma) = coeffs(i)?;
        let (low, diag, up) = stencil(grid[i] - grid[i - 1], grid[i + 1] - grid[i], r, q, sigma);
        op.set_mid_row(i, low, diag, up);
    }
    Ok(())
}

/// Build the time-constant Black–Scholes operator on a strictly increasing
/// log-price grid.
pub fn bsm_operator(
    grid: &[Real],
    r: Rate,
    q: Spread,
    sigma: Volatility,
) -> Result<TridiagonalOperator> {
    check_grid(grid)?;
    let mut op = TridiagonalOperator::new(grid.len());
    fill_rows(&mut op, grid, |_| Ok((r, q, sigma)))?;
    Ok(op)
}

/// Coefficient provider sampling a process's instantaneous forward rates
/// and forward volatility at each refresh time.
#[derive(Debug)]
struct BlackScholesTimeSetter {
    grid: Vec<Real>,
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl TimeSetter for BlackScholesTimeSetter {
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator) -> Result<()> {
        let t = t.max(0.0);
        let r = self.process.forward_rate(t)?;
        let q = self.process.forward_dividend_rate(t)?;
        fill_rows(op, &self.grid, |i| {
            let sigma = self.process.black_vol(t.max(1.0e-8), self.grid[i].exp())?;
            Ok((r, q, sigma))
        })
    }
}

/// Build a time-dependent Black–Scholes operator whose coefficients are
/// re-sampled from `process` on every `set_time`.
///
/// The returned operator reports `is_time_dependent() == true`, so schemes
/// refresh their cached matrices each step.
pub fn bsm_time_dependent_operator(
    grid: &[Real],
    process: Arc<GeneralizedBlackScholesProcess>,
) -> Result<TridiagonalOperator> {
    check_grid(grid)?;
    let setter = BlackScholesTimeSetter {
        grid: grid.to_vec(),
        process,
    };
    let mut op = TridiagonalOperator::new(grid.len());
    setter.set_time(0.0, &mut op)?;
    Ok(op.with_time_setter(Arc::new(setter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_math::Array;
    use qf_quotes::SimpleQuote;
    use qf_termstructures::{BlackConstantVol, FlatForward};
    use qf_time::Date;

    fn uniform_grid(n: usize, x0: Real, dx: Real) -> Vec<Real> {
        (0..n).map(|i| x0 + i as Real * dx).collect()
    }

    #[test]
    fn uniform_stencil_matches_closed_form() {
        let (r, q, sigma) = (0.05, 0.01, 0.2);
        let dx: Real = 0.01;
        let grid = uniform_grid(5, 0.0, dx);
        let op = bsm_operator(&grid, r, q, sigma).unwrap();

        // On a uniform grid the fitted drift weight has the closed form
        // b̃ = (a + b − a·2(cosh Δx − 1)/Δx²) / (sinh Δx / Δx).
        let a = 0.5 * sigma * sigma;
        let g2 = 2.0 * (dx.cosh() - 1.0) / (dx * dx);
        let g1 = dx.sinh() / dx;
        let b = (a + (r - q - a) - a * g2) / g1;
        let low = -a / (dx * dx) + b / (2.0 * dx);
        let diag = 2.0 * a / (dx * dx) + r;
        let up = -a / (dx * dx) - b / (2.0 * dx);

        // Probe the interior rows through apply_to on unit vectors.
        let mut e = Array::new(5);
        e[1] = 1.0;
        let col = op.apply_to(&e).unwrap();
        assert!((col[1] - diag).abs() < 1e-9 * diag.abs());
        assert!((col[2] - low).abs() < 1e-9 * low.abs());
        e[1] = 0.0;
        e[3] = 1.0;
        let col = op.apply_to(&e).unwrap();
        assert!((col[2] - up).abs() < 1e-9 * up.abs());
    }

    #[test]
    fn annihilates_the_discounted_drift_solution() {
        // V(x) = e^x is a solution of the stationary equation when q = 0 and
        // the discounting and drift terms cancel: D·e^x = 0 for r V − r V.
        // Check instead the exact identity D·1 = r (constant vector), since
        // second and first derivatives of a constant vanish.
        let grid = uniform_grid(7, -0.3, 0.1);
        let r = 0.07;
        let op = bsm_operator(&grid, r, 0.02, 0.25).unwrap();
        let ones = Array::from_element(7, 1.0);
        let out = op.apply_to(&ones).unwrap();
        for i in 1..6 {
            assert!(
                (out[i] - r).abs() < 1e-10,
                "row {i}: got {}, want {r}",
                out[i]
            );
        }
    }

    #[test]
    fn reproduces_the_forward_drift_on_the_price_vector() {
        // The fitted rows are exact on the exponential mode:
        // D·e^x = q·e^x at every interior node, uniform grid or not.
        let grid = uniform_grid(7, -0.3, 0.1);
        let (r, q, sigma) = (0.05, 0.02, 0.25);
        let op = bsm_operator(&grid, r, q, sigma).unwrap();
        let s = Array::from_fn(7, |i| grid[i].exp());
        let out = op.apply_to(&s).unwrap();
        for i in 1..6 {
            assert!(
                (out[i] - q * s[i]).abs() < 1e-10 * s[i],
                "row {i}: got {}, want {}",
                out[i],
                q * s[i]
            );
        }
    }

    #[test]
    fn non_uniform_grid_keeps_the_exact_identities() {
        // A deliberately uneven grid: both defining identities still hold
        // row by row.
        let grid = [-0.30, -0.17, -0.09, 0.0, 0.05, 0.16, 0.31];
        let (r, q, sigma) = (0.04, 0.015, 0.3);
        let op = bsm_operator(&grid, r, q, sigma).unwrap();

        let ones = Array::from_element(7, 1.0);
        let constant = op.apply_to(&ones).unwrap();
        let s = Array::from_fn(7, |i| grid[i].exp());
        let price = op.apply_to(&s).unwrap();
        for i in 1..6 {
            assert!((constant[i] - r).abs() < 1e-10, "row sums: {}", constant[i]);
            assert!(
                (price[i] - q * s[i]).abs() < 1e-10 * s[i],
                "forward drift at row {i}: {}",
                price[i]
            );
        }
    }

    #[test]
    fn rejects_non_monotone_grids() {
        assert!(bsm_operator(&[0.0, 0.0, 0.1], 0.05, 0.0, 0.2).is_err());
        assert!(bsm_operator(&[0.0, 0.1], 0.05, 0.0, 0.2).is_err());
    }

    #[test]
    fn time_dependent_rollback_matches_constant_coefficients() {
        // With flat curves the refreshed coefficients never change, so a
        // full rollback under the time-dependent operator must agree with
        // the constant one; the caches are rebuilt on every step either way.
        use crate::finite_differences::evolution_scheme::crank_nicolson;
        use crate::finite_differences::model::FiniteDifferenceModel;
        use crate::finite_differences::step_condition::NullCondition;

        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        let process = Arc::new(GeneralizedBlackScholesProcess::new(
            Arc::new(SimpleQuote::new(100.0)),
            Arc::new(FlatForward::act365(ref_date, 0.05)),
            Arc::new(FlatForward::act365(ref_date, 0.0)),
            Arc::new(BlackConstantVol::act365(ref_date, 0.20)),
        ));
        let grid: Vec<Real> = (0..41)
            .map(|i| 100.0_f64.ln() - 0.4 + 0.02 * i as Real)
            .collect();
        let payoff = Array::from_fn(41, |i| (grid[i].exp() - 100.0_f64).max(0.0));

        let dependent = bsm_time_dependent_operator(&grid, process).unwrap();
        let constant = bsm_operator(&grid, 0.05, 0.0, 0.20).unwrap();

        let mut a = payoff.clone();
        let mut model =
            FiniteDifferenceModel::new(crank_nicolson(dependent, vec![]).unwrap(), vec![]);
        model.rollback(&mut a, 1.0, 0.0, 20, &NullCondition).unwrap();

        let mut b = payoff;
        let mut reference =
            FiniteDifferenceModel::new(crank_nicolson(constant, vec![]).unwrap(), vec![]);
        reference.rollback(&mut b, 1.0, 0.0, 20, &NullCondition).unwrap();

        for i in 0..41 {
            assert!(
                (a[i] - b[i]).abs() < 1e-10,
                "node {i}: {} vs {}",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn time_dependent_operator_refreshes() {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        let process = Arc::new(GeneralizedBlackScholesProcess::new(
            Arc::new(SimpleQuote::new(100.0)),
            Arc::new(FlatForward::act365(ref_date, 0.05)),
            Arc::new(FlatForward::act365(ref_date, 0.0)),
            Arc::new(BlackConstantVol::act365(ref_date, 0.20)),
        ));
        let grid = uniform_grid(5, 100.0_f64.ln() - 0.2, 0.1);
        let mut op = bsm_time_dependent_operator(&grid, process).unwrap();
        assert!(op.is_time_dependent());

        // Flat curves: refreshing at a later time reproduces the constant
        // operator exactly.
        let reference = bsm_operator(&grid, 0.05, 0.0, 0.20).unwrap();
        op.set_time(0.5).unwrap();
        let v = Array::from_fn(5, |i| i as Real);
        let x = op.apply_to(&v).unwrap();
        let y = reference.apply_to(&v).unwrap();
        for i in 1..4 {
            assert!((x[i] - y[i]).abs() < 1e-10);
        }
    }
}
