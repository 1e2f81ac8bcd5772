//! Shared finite-difference scaffolding and the European engine.
//!
//! Every FD engine follows the same recipe: flatten the process to the
//! scalars the PDE needs, build a log-price grid with the spot on the
//! centre node, roll the terminal payoff back under Crank–Nicolson with
//! payoff-slope Neumann conditions at both ends, and read value, Δ, and Γ
//! off the three central nodes.  Θ comes from keeping the value one step
//! before expiry of the rollback; ρ and ν from re-pricing under perturbed
//! rate and volatility.  Results are cached against the spot quote's
//! version and the instrument fingerprint.

use qf_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real, Size, Spread, Time, Volatility,
};
use qf_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, StrikedPayoff,
    VanillaOptionArguments,
};
use qf_math::Array;
use qf_methods::{
    asset_grid, bounded_log_grid, bsm_operator, crank_nicolson, BoundaryCondition,
    FiniteDifferenceModel, NullCondition, Side, StepCondition,
};
use qf_processes::GeneralizedBlackScholesProcess;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// Absolute bump used for the numerical ρ and ν.
pub(crate) const GREEK_BUMP: Real = 1.0e-4;

/// Scalar market data and resolution for one PDE solve.
pub(crate) struct FdSetup<'a> {
    pub payoff: &'a dyn StrikedPayoff,
    pub spot: Real,
    pub r: Rate,
    pub q: Spread,
    pub sigma: Volatility,
    /// Volatility used for sizing the grid.  Kept at the unbumped value
    /// while ν is being differenced, so both re-pricings see the same
    /// nodes and the discretisation error cancels.
    pub grid_sigma: Volatility,
    pub maturity: Time,
    pub grid_points: Size,
    pub time_steps: Size,
}

/// Value and model greeks read off the grid.
pub(crate) struct FdOutcome {
    pub npv: Real,
    pub delta: Real,
    pub gamma: Real,
    pub theta: Real,
}

/// Builds the step condition from the asset grid and intrinsic values.
pub(crate) type ConditionFactory<'a> =
    &'a dyn Fn(&[Real], &Array) -> Result<Box<dyn StepCondition>>;

/// Roll the terminal payoff back to today and extract value and greeks.
pub(crate) fn solve(
    setup: &FdSetup<'_>,
    stopping_times: &[Time],
    condition: ConditionFactory<'_>,
) -> Result<FdOutcome> {
    ensure!(
        setup.time_steps >= 2,
        "need at least 2 time steps, got {}",
        setup.time_steps
    );
    ensure!(
        setup.maturity > 0.0,
        "the option must not be expired (maturity {})",
        setup.maturity
    );

    let grid = bounded_log_grid(
        setup.spot,
        setup.payoff.strike(),
        setup.grid_sigma,
        setup.maturity,
        setup.grid_points,
    )?;
    let s = asset_grid(&grid);
    let n = s.len();
    let intrinsic = Array::from_fn(n, |i| setup.payoff.value(s[i]));

    // Zero-curvature conditions at both ends, the value taken from the
    // payoff slope across the boundary cell.
    let bcs = vec![
        BoundaryCondition::Neumann {
            side: Side::Lower,
            value: intrinsic[1] - intrinsic[0],
        },
        BoundaryCondition::Neumann {
            side: Side::Upper,
            value: intrinsic[n - 1] - intrinsic[n - 2],
        },
    ];

    let operator = bsm_operator(&grid, setup.r, setup.q, setup.sigma)?;
    let scheme = crank_nicolson(operator, bcs)?;
    let mut model = FiniteDifferenceModel::new(scheme, stopping_times.to_vec());
    let condition = condition(&s, &intrinsic)?;

    let mut values = intrinsic.clone();
    let centre = n / 2;
    let dt = setup.maturity / setup.time_steps as Time;

    // Stop one step short of today, keep the centre value for Θ, then take
    // the final step.
    model.rollback(
        &mut values,
        setup.maturity,
        dt,
        setup.time_steps - 1,
        condition.as_ref(),
    )?;
    let value_one_step_out = values[centre];
    model.rollback(&mut values, dt, 0.0, 1, condition.as_ref())?;

    let npv = values[centre];
    let delta = (values[centre + 1] - values[centre - 1]) / (s[centre + 1] - s[centre - 1]);
    let h_minus = s[centre] - s[centre - 1];
    let h_plus = s[centre + 1] - s[centre];
    let gamma = ((values[centre + 1] - values[centre]) / h_plus
        - (values[centre] - values[centre - 1]) / h_minus)
        / (0.5 * (h_minus + h_plus));
    let theta = (value_one_step_out - npv) / dt;

    Ok(FdOutcome {
        npv,
        delta,
        gamma,
        theta,
    })
}

/// Centred-difference ρ and ν from a re-pricing closure
/// `solve_npv(rate bump, vol bump)`.
pub(crate) fn bump_greeks(
    solve_npv: impl Fn(Real, Real) -> Result<Real>,
) -> Result<(Real, Real)> {
    let rho = (solve_npv(GREEK_BUMP, 0.0)? - solve_npv(-GREEK_BUMP, 0.0)?) / (2.0 * GREEK_BUMP);
    let vega = (solve_npv(0.0, GREEK_BUMP)? - solve_npv(0.0, -GREEK_BUMP)?) / (2.0 * GREEK_BUMP);
    Ok((rho, vega))
}

/// Hash an instrument/resolution fingerprint for the results cache.
pub(crate) fn fingerprint(option_type: OptionType, fields: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    match option_type {
        OptionType::Call => 0u8.hash(&mut hasher),
        OptionType::Put => 1u8.hash(&mut hasher),
    }
    for f in fields {
        f.hash(&mut hasher);
    }
    hasher.finish()
}

/// Cached results keyed by spot-quote version and instrument fingerprint.
#[derive(Debug, Default)]
pub(crate) struct ResultsCache(Mutex<Option<(u64, u64, PricingResults)>>);

impl ResultsCache {
    pub fn lookup(&self, version: u64, fingerprint: u64) -> Option<PricingResults> {
        let guard = self.0.lock().expect("results cache poisoned");
        match guard.as_ref() {
            Some((v, f, results)) if *v == version && *f == fingerprint => Some(results.clone()),
            _ => None,
        }
    }

    pub fn store(&self, version: u64, fingerprint: u64, results: &PricingResults) {
        *self.0.lock().expect("results cache poisoned") =
            Some((version, fingerprint, results.clone()));
    }
}

/// Assemble the engine results from the base solve and the bump greeks.
pub(crate) fn results_from(outcome: &FdOutcome, rho: Real, vega: Real) -> PricingResults {
    PricingResults::from_npv(outcome.npv)
        .with_result("delta", outcome.delta)
        .with_result("gamma", outcome.gamma)
        .with_result("theta", outcome.theta)
        .with_result("rho", rho)
        .with_result("vega", vega)
}

// ── European engine ───────────────────────────────────────────────────────────

/// Finite-difference engine for European vanilla options.
///
/// Mostly a cross-check for the analytic engine, and the baseline the
/// step-condition engines are built on.
#[derive(Debug)]
pub struct FdEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid_points: Size,
    time_steps: Size,
    cache: ResultsCache,
}

impl FdEuropeanEngine {
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

impl PricingEngine<VanillaOptionArguments> for FdEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::NotImplemented(
                "FdEuropeanEngine prices European exercise only".into(),
            ));
        }
        let spot = self.process.spot()?;
        let strike = args.payoff.strike();
        let t = self.process.time_from_reference(args.exercise.last_date());

        let fp = fingerprint(
            args.payoff.option_type(),
            &[
                strike.to_bits(),
                t.to_bits(),
                self.grid_points as u64,
                self.time_steps as u64,
            ],
        );
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
            solve(
                &FdSetup {
                    payoff: &*args.payoff,
                    spot,
                    r: r + dr,
                    q,
                    sigma: sigma + dv,
                    grid_sigma: sigma,
                    maturity: t,
                    grid_points: self.grid_points,
                    time_steps: self.time_steps,
                },
                &[],
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
