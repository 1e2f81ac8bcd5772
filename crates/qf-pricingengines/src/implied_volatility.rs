//! Implied-volatility inversion.
//!
//! Inverts the Black–Scholes–Merton formula for the volatility that
//! reproduces a quoted price.  Newton iteration on the analytic vega does
//! the work; when the quote sits in a flat-vega corner the bracketed Brent
//! solver takes over.

use crate::analytic_european_engine::black_scholes_merton;
use qf_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real, Spread, Time, Volatility,
};
use qf_instruments::OptionType;
use qf_math::solvers1d::{brent, newton};

const MIN_VOL: Volatility = 1.0e-4;
const MAX_VOL: Volatility = 5.0;
const PRICE_ACCURACY: Real = 1.0e-10;

/// Solve for the Black–Scholes volatility that reprices `target`.
///
/// Fails with a precondition error when the target violates the static
/// arbitrage bounds for the given forward and discounting, and with a
/// runtime error when no volatility in `[1e-4, 5]` reproduces it.
pub fn implied_volatility(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Spread,
    time_to_expiry: Time,
    target: Real,
) -> Result<Volatility> {
    ensure!(spot > 0.0, "spot must be positive, got {spot}");
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(
        time_to_expiry > 0.0,
        "the option must not be expired (maturity {time_to_expiry})"
    );

    let df_r = (-risk_free_rate * time_to_expiry).exp();
    let df_q = (-dividend_yield * time_to_expiry).exp();
    let (lower, upper) = match option_type {
        OptionType::Call => ((spot * df_q - strike * df_r).max(0.0), spot * df_q),
        OptionType::Put => ((strike * df_r - spot * df_q).max(0.0), strike * df_r),
    };
    ensure!(
        target > lower && target < upper,
        "target price {target} violates the arbitrage bounds ({lower}, {upper})"
    );

    let price_gap = |sigma: Volatility| {
        let (price, ..) = black_scholes_merton(
            option_type,
            spot,
            strike,
            risk_free_rate,
            dividend_yield,
            sigma,
            time_to_expiry,
        );
        price - target
    };
    let vega = |sigma: Volatility| {
        black_scholes_merton(
            option_type,
            spot,
            strike,
            risk_free_rate,
            dividend_yield,
            sigma,
            time_to_expiry,
        )
        .3
    };

    // Brenner–Subrahmanyam seed, clamped into the search bracket.
    let seed = ((2.0 * std::f64::consts::PI / time_to_expiry).sqrt() * target / spot)
        .clamp(MIN_VOL, MAX_VOL);

    newton(&price_gap, vega, seed, MIN_VOL, MAX_VOL, PRICE_ACCURACY)
        .or_else(|_| brent(&price_gap, MIN_VOL, MAX_VOL, PRICE_ACCURACY))
        .map_err(|_| {
            Error::Runtime(format!(
                "no volatility in [{MIN_VOL}, {MAX_VOL}] reprices {target}"
            ))
        })
}
