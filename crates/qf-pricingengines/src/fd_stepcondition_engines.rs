//! Finite-difference engines with per-step exercise conditions.
//!
//! `FdAmericanEngine` floors the rolled-back values at intrinsic on every
//! step; `FdShoutEngine` floors them at the discounted locked-in intrinsic.
//! Everything else — grid, boundary conditions, rollback, greeks — is the
//! shared vanilla scaffolding.

use crate::fd_vanilla_engine::{
    bump_greeks, fingerprint, results_from, solve, ConditionFactory, FdSetup, ResultsCache,
};
use qf_core::{
    errors::{Error, Result},
    Rate, Real, Size, Time,
};
use qf_instruments::{
    ExerciseType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use qf_methods::{AmericanCondition, ShoutCondition, StepCondition};
use qf_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Finite-difference engine for American vanilla options.
#[derive(Debug)]
pub struct FdAmericanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid_points: Size,
    time_steps: Size,
    cache: ResultsCache,
}

impl FdAmericanEngine {
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

impl PricingEngine<VanillaOptionArguments> for FdAmericanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::American {
            return Err(Error::NotImplemented(
                "FdAmericanEngine prices American exercise only".into(),
            ));
        }
        step_condition_calculate(
            &self.process,
            &self.cache,
            self.grid_points,
            self.time_steps,
            args,
            &|_, intrinsic, _, _| {
                Ok(Box::new(AmericanCondition::new(intrinsic.clone())) as Box<dyn StepCondition>)
            },
        )
    }
}

/// Finite-difference engine for shout options: at any time up to expiry
/// the holder may lock in the intrinsic value, paid at expiry.
#[derive(Debug)]
pub struct FdShoutEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid_points: Size,
    time_steps: Size,
    cache: ResultsCache,
}

impl FdShoutEngine {
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

impl PricingEngine<VanillaOptionArguments> for FdShoutEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        step_condition_calculate(
            &self.process,
            &self.cache,
            self.grid_points,
            self.time_steps,
            args,
            &|_, intrinsic, maturity, rate| {
                Ok(Box::new(ShoutCondition::new(intrinsic.clone(), maturity, rate))
                    as Box<dyn StepCondition>)
            },
        )
    }
}

/// The shared calculate body: the engines differ only in the condition
/// they hand the rollback.
#[allow(clippy::type_complexity)]
fn step_condition_calculate(
    process: &Arc<GeneralizedBlackScholesProcess>,
    cache: &ResultsCache,
    grid_points: Size,
    time_steps: Size,
    args: &VanillaOptionArguments,
    make_condition: &dyn Fn(
        &[Real],
        &qf_math::Array,
        Time,
        Rate,
    ) -> Result<Box<dyn StepCondition>>,
) -> Result<PricingResults> {
    let spot = process.spot()?;
    let strike = args.payoff.strike();
    let t = process.time_from_reference(args.exercise.last_date());

    let fp = fingerprint(
        args.payoff.option_type(),
        &[
            strike.to_bits(),
            t.to_bits(),
            grid_points as u64,
            time_steps as u64,
        ],
    );
    let version = process.spot_version();
    if let Some(results) = cache.lookup(version, fp) {
        return Ok(results);
    }

    let r = process.zero_rate(t)?;
    let q = process.dividend_rate(t)?;
    let sigma = process.black_vol(t, strike)?;

    let solve_at = |dr: Real, dv: Real| {
        let condition: ConditionFactory<'_> =
            &|s, intrinsic| make_condition(s, intrinsic, t, r + dr);
        solve(
            &FdSetup {
                payoff: &*args.payoff,
                spot,
                r: r + dr,
                q,
                sigma: sigma + dv,
                grid_sigma: sigma,
                maturity: t,
                grid_points,
                time_steps,
            },
            &[],
            condition,
        )
    };

    let base = solve_at(0.0, 0.0)?;
    let (rho, vega) = bump_greeks(|dr, dv| solve_at(dr, dv).map(|o| o.npv))?;

    let results = results_from(&base, rho, vega);
    cache.store(version, fp, &results);
    Ok(results)
}
