//! Finite-difference engines for options on stocks paying discrete cash
//! dividends.
//!
//! The ex-dividend instants are registered as rollback stopping times, so
//! the model subdivides whichever step they fall into and the conditions
//! see them exactly.
//!
//! Model choice per engine:
//!
//! * `FdDividendEuropeanEngine` prices along the escrowed-dividend path:
//!   the PDE variable is the spot stripped of the riskless-discounted
//!   dividends, which is continuous across every ex-dividend date.  This
//!   reproduces the classic escrowed analytic value in the limit.
//! * `FdDividendAmericanEngine` works in true price coordinates, where the
//!   asset drops by the full dividend at each ex-date: a
//!   [`DividendCondition`] shifts the solution vector by grid interpolation
//!   and an [`AmericanCondition`] floors it at intrinsic, both through one
//!   ordered condition set.  Early exercise needs the true price, so the
//!   escrowed shortcut is not available here.

use crate::fd_vanilla_engine::{
    bump_greeks, fingerprint, results_from, solve, ConditionFactory, FdSetup, ResultsCache,
};
use qf_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real, Size, Time,
};
use qf_instruments::{
    DividendVanillaOptionArguments, ExerciseType, PricingEngine, PricingResults,
};
use qf_methods::{
    AmericanCondition, DividendCondition, NullCondition, StepCondition, StepConditionSet,
};
use qf_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

fn present_value_of_dividends(dividends: &[Real], times: &[Time], r: Rate) -> Real {
    dividends
        .iter()
        .zip(times)
        .map(|(&d, &t)| d * (-r * t).exp())
        .sum()
}

fn validate_schedule(args: &DividendVanillaOptionArguments, maturity: Time, steps: Size) -> Result<()> {
    ensure!(
        args.ex_div_times.iter().all(|&t| t < maturity),
        "every ex-dividend time must precede expiry"
    );
    if args.ex_div_times.len() >= steps {
        return Err(Error::NotImplemented(format!(
            "{} dividends need more than {steps} time steps",
            args.ex_div_times.len()
        )));
    }
    Ok(())
}

fn dividend_fingerprint(args: &DividendVanillaOptionArguments, t: Time, n: Size, m: Size) -> u64 {
    let mut fields = vec![
        args.vanilla.payoff.strike().to_bits(),
        t.to_bits(),
        n as u64,
        m as u64,
    ];
    fields.extend(args.dividends.iter().map(|d| d.to_bits()));
    fields.extend(args.ex_div_times.iter().map(|t| t.to_bits()));
    fingerprint(args.vanilla.payoff.option_type(), &fields)
}

// ── European ─────────────────────────────────────────────────────────────────

/// Finite-difference engine for European options with discrete dividends
/// (escrowed-dividend dynamics).
#[derive(Debug)]
pub struct FdDividendEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid_points: Size,
    time_steps: Size,
    cache: ResultsCache,
}

impl FdDividendEuropeanEngine {
    /// Create an engine with the default 500-point, 500-step resolution.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self::with_resolution(process, 500, 500)
    }

    /// Create an engine with explicit grid and time resolution.
    pub fn with_resolution(
        process: Arc<GeneralizedBlackScholesProcess>,
        grid_points: Size,
        time_steps: Size,
    ) -> Self {
        Self {
            process,
            grid_points,
            time_steps,
            cache: ResultsCache::default(),
        }
    }
}

impl PricingEngine<DividendVanillaOptionArguments> for FdDividendEuropeanEngine {
    fn calculate(&self, args: &DividendVanillaOptionArguments) -> Result<PricingResults> {
        if args.vanilla.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::NotImplemented(
                "FdDividendEuropeanEngine prices European exercise only".into(),
            ));
        }
        let spot = self.process.spot()?;
        let strike = args.vanilla.payoff.strike();
        let t = self
            .process
            .time_from_reference(args.vanilla.exercise.last_date());
        validate_schedule(args, t, self.time_steps)?;

        let fp = dividend_fingerprint(args, t, self.grid_points, self.time_steps);
        let version = self.process.spot_version();
        if let Some(results) = self.cache.lookup(version, fp) {
            return Ok(results);
        }

        let r = self.process.zero_rate(t)?;
        let q = self.process.dividend_rate(t)?;
        let sigma = self.process.black_vol(t, strike)?;

        let null_condition: ConditionFactory<'_> =
            &|_, _| Ok(Box::new(NullCondition) as Box<dyn StepCondition>);
        let solve_at = |dr: Real, dv: Real| {
            // The stripped spot is what diffuses; it must be re-stripped
            // under the bumped rate for a consistent ρ.
            let pv = present_value_of_dividends(&args.dividends, &args.ex_div_times, r + dr);
            let stripped = spot - pv;
            ensure!(
                stripped > 0.0,
                "dividends exceed the spot: present value {pv} vs spot {spot}"
            );
            solve(
                &FdSetup {
                    payoff: &*args.vanilla.payoff,
                    spot: stripped,
                    r: r + dr,
                    q,
                    sigma: sigma + dv,
                    grid_sigma: sigma,
                    maturity: t,
                    grid_points: self.grid_points,
                    time_steps: self.time_steps,
                },
                &args.ex_div_times,
                null_condition,
            )
        };

        let base = solve_at(0.0, 0.0)?;
        let (rho, vega) = bump_greeks(|dr, dv| solve_at(dr, dv).map(|o| o.npv))?;

        let results = results_from(&base, rho, vega);
        self.cache.store(version, fp, &results);
        Ok(results)
    }
}

// ── American ─────────────────────────────────────────────────────────────────

/// Finite-difference engine for American options with discrete dividends
/// (true-price jump dynamics).
#[derive(Debug)]
pub struct FdDividendAmericanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid_points: Size,
    time_steps: Size,
    cache: ResultsCache,
}

impl FdDividendAmericanEngine {
    /// Create an engine with the default 500-point, 500-step resolution.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self::with_resolution(process, 500, 500)
    }

    /// Create an engine with explicit grid and time resolution.
    pub fn with_resolution(
        process: Arc<GeneralizedBlackScholesProcess>,
        grid_points: Size,
        time_steps: Size,
    ) -> Self {
        Self {
            process,
            grid_points,
            time_steps,
            cache: ResultsCache::default(),
        }
    }
}

impl PricingEngine<DividendVanillaOptionArguments> for FdDividendAmericanEngine {
    fn calculate(&self, args: &DividendVanillaOptionArguments) -> Result<PricingResults> {
        if args.vanilla.exercise.exercise_type() != ExerciseType::American {
            return Err(Error::NotImplemented(
                "FdDividendAmericanEngine prices American exercise only".into(),
            ));
        }
        let spot = self.process.spot()?;
        let strike = args.vanilla.payoff.strike();
        let t = self
            .process
            .time_from_reference(args.vanilla.exercise.last_date());
        validate_schedule(args, t, self.time_steps)?;

        let fp = dividend_fingerprint(args, t, self.grid_points, self.time_steps);
        let version = self.process.spot_version();
        if let Some(results) = self.cache.lookup(version, fp) {
            return Ok(results);
        }

        let r = self.process.zero_rate(t)?;
        let q = self.process.dividend_rate(t)?;
        let sigma = self.process.black_vol(t, strike)?;

        let condition: ConditionFactory<'_> = &|s, intrinsic| {
            Ok(Box::new(StepConditionSet::new(vec![
                Box::new(DividendCondition::new(
                    s.to_vec(),
                    args.dividends.clone(),
                    args.ex_div_times.clone(),
                )?),
                Box::new(AmericanCondition::new(intrinsic.clone())),
            ])) as Box<dyn StepCondition>)
        };
        let solve_at = |dr: Real, dv: Real| {
            solve(
                &FdSetup {
                    payoff: &*args.vanilla.payoff,
                    spot,
                    r: r + dr,
                    q,
                    sigma: sigma + dv,
                    grid_sigma: sigma,
                    maturity: t,
                    grid_points: self.grid_points,
                    time_steps: self.time_steps,
                },
                &args.ex_div_times,
                condition,
            )
        };

        let base = solve_at(0.0, 0.0)?;
        let (rho, vega) = bump_greeks(|dr, dv| solve_at(dr, dv).map(|o| o.npv))?;

        let results = results_from(&base, rho, vega);
        self.cache.store(version, fp, &results);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use qf_instruments::{
        DividendVanillaOption, Exercise, OptionType, PlainVanillaPayoff, StrikedPayoff,
    };
    use qf_quotes::SimpleQuote;
    use qf_termstructures::{BlackConstantVol, FlatForward};
    use qf_time::Date;

    fn process(spot: Real) -> Arc<GeneralizedBlackScholesProcess> {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        Arc::new(GeneralizedBlackScholesProcess::new(
            Arc::new(SimpleQuote::new(spot)),
            Arc::new(FlatForward::act365(ref_date, 0.05)),
            Arc::new(FlatForward::act365(ref_date, 0.0)),
            Arc::new(BlackConstantVol::act365(ref_date, 0.20)),
        ))
    }

    fn dividend_option(
        option_type: OptionType,
        strike: Real,
        american: bool,
        dividends: Vec<Real>,
        times: Vec<Time>,
    ) -> DividendVanillaOption {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        let expiry = Date::from_ymd(2026, 1, 2).unwrap();
        let payoff: Arc<dyn StrikedPayoff> = Arc::new(PlainVanillaPayoff::new(option_type, strike));
        let exercise = if american {
            Exercise::american(ref_date, expiry)
        } else {
            Exercise::european(expiry)
        };
        DividendVanillaOption::new(payoff, exercise, dividends, times).unwrap()
    }

    #[test]
    fn european_matches_the_escrowed_benchmark() {
        let engine = FdDividendEuropeanEngine::with_resolution(process(100.0), 401, 400);
        let option = dividend_option(OptionType::Call, 100.0, false, vec![5.0], vec![0.5]);
        let npv = option.price(&engine).unwrap().npv;

        let stripped = 100.0 - 5.0 * (-0.05_f64 * 0.5).exp();
        let (escrowed, ..) =
            black_scholes_merton(OptionType::Call, stripped, 100.0, 0.05, 0.0, 0.20, 1.0);
        assert!(
            (npv - escrowed).abs() < 1e-3,
            "fd {npv} vs escrowed {escrowed}"
        );
    }

    #[test]
    fn no_dividends_degenerates_to_plain_european() {
        let engine = FdDividendEuropeanEngine::with_resolution(process(100.0), 201, 200);
        let option = dividend_option(OptionType::Call, 100.0, false, vec![], vec![]);
        let npv = option.price(&engine).unwrap().npv;
        let (plain, ..) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
        assert!((npv - plain).abs() < 5e-3, "fd {npv} vs analytic {plain}");
    }

    #[test]
    fn dividends_lower_calls_and_raise_puts() {
        let engine = FdDividendEuropeanEngine::with_resolution(process(100.0), 201, 200);
        let call = dividend_option(OptionType::Call, 100.0, false, vec![4.0], vec![0.5]);
        let put = dividend_option(OptionType::Put, 100.0, false, vec![4.0], vec![0.5]);
        let plain_call = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).0;
        let plain_put = black_scholes_merton(OptionType::Put, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).0;

        assert!(call.price(&engine).unwrap().npv < plain_call - 0.5);
        assert!(put.price(&engine).unwrap().npv > plain_put + 0.5);
    }

    #[test]
    fn american_call_with_dividends_exceeds_european() {
        // A dividend makes early exercise of a call just before the ex-date
        // potentially optimal, so the American value must dominate.
        let european = FdDividendEuropeanEngine::with_resolution(process(100.0), 201, 200);
        let american = FdDividendAmericanEngine::with_resolution(process(100.0), 201, 200);
        let euro_option = dividend_option(OptionType::Call, 90.0, false, vec![8.0], vec![0.75]);
        let amer_option = dividend_option(OptionType::Call, 90.0, true, vec![8.0], vec![0.75]);

        let euro = euro_option.price(&european).unwrap().npv;
        let amer = amer_option.price(&american).unwrap().npv;
        assert!(amer > euro, "american {amer} vs european {euro}");
    }

    #[test]
    fn too_many_dividends_for_the_step_count() {
        let engine = FdDividendEuropeanEngine::with_resolution(process(100.0), 51, 4);
        let option = dividend_option(
            OptionType::Call,
            100.0,
            false,
            vec![1.0; 5],
            vec![0.1, 0.2, 0.3, 0.4, 0.5],
        );
        assert!(matches!(
            option.price(&engine),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn ex_div_time_after_expiry_is_rejected() {
        let engine = FdDividendEuropeanEngine::with_resolution(process(100.0), 51, 50);
        let option = dividend_option(OptionType::Call, 100.0, false, vec![1.0], vec![1.5]);
        assert!(option.price(&engine).is_err());
    }
}
