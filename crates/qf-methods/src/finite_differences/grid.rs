//! Spatial grids for the PDE solvers.

use qf_core::{ensure, errors::Result, Real, Size, Time, Volatility};

/// Build a uniform log-price grid centred at `ln(spot)`.
///
/// The half-width is `4σ√T`, widened when necessary so the strike stays
/// comfortably inside the grid (`|ln(K/S₀)| + 2σ√T`).  The point count is
/// bumped to the next odd number so the spot sits exactly on the centre
/// node, which lets the engines read values and greeks off the grid without
/// interpolating.
pub fn bounded_log_grid(
    spot: Real,
    strike: Real,
    sigma: Volatility,
    maturity: Time,
    points: Size,
) -> Result<Vec<Real>> {
    ensure!(spot > 0.0, "spot must be positive, got {spot}");
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(sigma > 0.0, "volatility must be positive, got {sigma}");
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    ensure!(points >= 5, "need at least 5 grid points, got {points}");

    let n = if points % 2 == 0 { points + 1 } else { points };
    let center = spot.ln();
    let spread = sigma * maturity.sqrt();
    let half_width = (4.0 * spread).max((strike / spot).ln().abs() + 2.0 * spread);
    let dx = 2.0 * half_width / (n - 1) as Real;
    let mid = (n / 2) as i64;

    Ok((0..n)
        .map(|i| center + (i as i64 - mid) as Real * dx)
        .collect())
}

/// Map a log-price grid to asset prices.
pub fn asset_grid(log_grid: &[Real]) -> Vec<Real> {
    log_grid.iter().map(|&x| x.exp()).collect()
}

/// Validate that a grid is strictly increasing and large enough to carry a
/// second-order stencil.
pub fn check_grid(grid: &[Real]) -> Result<()> {
    ensure!(grid.len() >= 3, "need at least 3 grid points, got {}", grid.len());
    ensure!(
        grid.windows(2).all(|w| w[0] < w[1]),
        "grid must be strictly increasing"
    );
    Ok(())
}
