//! Analytic European option engine (Black–Scholes–Merton).
//!
//! The closed-form benchmark sibling of the finite-difference family:
//!
//! C = S e^{−qT} N(d₁) − K e^{−rT} N(d₂),
//! P = K e^{−rT} N(−d₂) − S e^{−qT} N(−d₁),
//!
//! with d₁,₂ = [ln(S/K) + (r − q ± σ²/2)T] / (σ√T).

use qf_core::{errors::{Error, Result}, Real};
use qf_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use qf_math::{normal_cdf, normal_pdf};
use qf_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Compute the Black–Scholes–Merton price and greeks for a European option.
///
/// Returns `(price, delta, gamma, vega, theta, rho)`.  Vega is per unit of
/// absolute volatility, theta per year, rho per unit rate shift.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> (Real, Real, Real, Real, Real, Real) {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (intrinsic, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let far = if fwd > strike { 1e15 } else { -1e15 };
        (far, far)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = df_q * npd1 / (spot * std_dev);
    let vega = spot * df_q * npd1 * sqrt_t;
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;
    let rho = phi * strike * t * df_r * nd2;

    (price, delta, gamma, vega, theta, rho)
}

/// Closed-form pricing engine for European vanilla options.
#[derive(Debug)]
pub struct AnalyticEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticEuropeanEngine {
    /// Create an engine over the given process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::NotImplemented(
                "the analytic engine prices European exercise only".into(),
            ));
        }
        let spot = self.process.spot()?;
        let strike = args.payoff.strike();
        let t = self.process.time_from_reference(args.exercise.last_date());

        let r = self.process.zero_rate(t)?;
        let q = self.process.dividend_rate(t)?;
        let sigma = self.process.black_vol(t, strike)?;

        let (price, delta, gamma, vega, theta, rho) =
            black_scholes_merton(args.payoff.option_type(), spot, strike, r, q, sigma, t);

        Ok(PricingResults::from_npv(price)
            .with_result("delta", delta)
            .with_result("gamma", gamma)
            .with_result("vega", vega)
            .with_result("theta", theta)
            .with_result("rho", rho))
    }
}
