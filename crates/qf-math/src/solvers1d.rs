//! 1-D root finders.
//!
//! Brent's method for bracketed roots and a safeguarded Newton iteration for
//! when the derivative is available (implied-volatility style inversions).

use qf_core::{
    errors::{Error, Result},
    Real,
};

const MAX_ITERATIONS: u32 = 100;

/// Find a root of `f` in `[x_min, x_max]` with Brent's method.
///
/// `f(x_min)` and `f(x_max)` must bracket the root (opposite signs).
pub fn brent<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(Error::Precondition(format!(
            "brent: root not bracketed, f({a}) = {fa}, f({b}) = {fb}"
        )));
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb.abs() > fc.abs() {
            // b is the best guess; keep it that way.
            (a, b, c) = (b, c, b);
            (fa, fb, fc) = (fb, fc, fb);
        }
        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * accuracy;
        let mid = 0.5 * (c - b);
        if mid.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Attempt inverse quadratic interpolation / secant.
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * mid * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * mid * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            if 2.0 * p < (3.0 * mid * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = mid;
                e = d;
            }
        } else {
            d = mid;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if mid > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
    }

    Err(Error::Runtime(format!(
        "brent: no convergence after {MAX_ITERATIONS} iterations"
    )))
}

/// Find a root of `f` with Newton's method, falling back to bisection when a
/// step leaves the bracket `[x_min, x_max]`.
pub fn newton<F, G>(f: F, df: G, guess: Real, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
    G: Fn(Real) -> Real,
{
    if x_min >= x_max {
        return Err(Error::Precondition(format!(
            "newton: empty bracket [{x_min}, {x_max}]"
        )));
    }
    let mut lo = x_min;
    let mut hi = x_max;
    let mut x = guess.clamp(lo, hi);
    let increasing = f(x_min) <= f(x_max);

    for _ in 0..MAX_ITERATIONS {
        let fx = f(x);
        if fx.abs() < accuracy {
            return Ok(x);
        }
        if (fx > 0.0) == increasing {
            hi = x;
        } else {
            lo = x;
        }
        let dfx = df(x);
        let step = if dfx != 0.0 { fx / dfx } else { 0.0 };
        let candidate = x - step;
        x = if dfx == 0.0 || candidate <= lo || candidate >= hi {
            0.5 * (lo + hi)
        } else {
            candidate
        };
    }

    Err(Error::Runtime(format!(
        "newton: no convergence after {MAX_ITERATIONS} iterations"
    )))
}
