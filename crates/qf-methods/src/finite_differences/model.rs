//! The rollback driver.
//!
//! `FiniteDifferenceModel` walks time backward in uniform steps, advancing
//! the solution with its evolution scheme and applying the step condition
//! after every advance.  When a stopping time falls inside a step the step
//! is split: advance to the stopping time, apply the condition there,
//! advance the remainder, and restore the original step length.  Each
//! stopping time is therefore visited exactly once.
//!
//! The driver knows nothing about Black–Scholes; it only advances, stops,
//! and applies.

use crate::finite_differences::evolution_scheme::EvolutionScheme;
use crate::finite_differences::step_condition::StepCondition;
use qf_core::{
    ensure,
    errors::{Error, Result},
    Size, Time,
};
use qf_math::{close, Array};

/// Stopping times closer together than this are treated as one.
const TIME_TOLERANCE: Time = 1.0e-10;

/// Rollback driver over an evolution scheme and a set of stopping times.
#[derive(Debug)]
pub struct FiniteDifferenceModel<S: EvolutionScheme> {
    evolver: S,
    stopping_times: Vec<Time>,
}

impl<S: EvolutionScheme> FiniteDifferenceModel<S> {
    /// Create a model; stopping times are sorted and deduplicated.
    pub fn new(evolver: S, mut stopping_times: Vec<Time>) -> Self {
        stopping_times.sort_by(|a, b| a.partial_cmp(b).expect("stopping times must be finite"));
        stopping_times.dedup_by(|a, b| close(*a, *b, TIME_TOLERANCE));
        Self {
            evolver,
            stopping_times,
        }
    }

    /// The wrapped evolver.
    pub fn evolver(&self) -> &S {
        &self.evolver
    }

    /// The registered stopping times, ascending.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// Roll the solution back from `from` to `to` in `steps` uniform
    /// intervals, applying `condition` after every advance.
    ///
    /// Fails with `NotImplemented` when more stopping times fall strictly
    /// inside `(to, from)` than there are steps: at most one stopping time
    /// per interval is supported, and the caller chooses the step count
    /// accordingly.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        condition: &dyn StepCondition,
    ) -> Result<()> {
        ensure!(steps > 0, "rollback needs at least one step");
        ensure!(
            from > to && to >= 0.0,
            "rollback runs backward: need from > to >= 0, got from {from}, to {to}"
        );
        let interior = self
            .stopping_times
            .iter()
            .filter(|&&s| s > to + TIME_TOLERANCE && s < from - TIME_TOLERANCE)
            .count();
        if interior > steps {
            return Err(Error::NotImplemented(format!(
                "{interior} stopping times inside ({to}, {from}) but only {steps} steps"
            )));
        }

        let dt = (from - to) / steps as Time;
        self.evolver.set_step(dt)?;

        let mut t = from;
        for _ in 0..steps {
            let next = t - dt;
            let hit = self
                .stopping_times
                .iter()
                .copied()
                .find(|&s| next <= s && s < t);
            match hit {
                None => {
                    self.evolver.step(a, t)?;
                    condition.apply_to(a, next)?;
                }
                Some(s) => {
                    // Split the step at the stopping time.  The first
                    // fragment may be of zero length, which the scheme
                    // skips.
                    self.evolver.set_step(t - s)?;
                    self.evolver.step(a, t)?;
                    condition.apply_to(a, s)?;

                    if s - next > TIME_TOLERANCE {
                        self.evolver.set_step(s - next)?;
                        self.evolver.step(a, s)?;
                        condition.apply_to(a, next)?;
                    }
                    // A stopping time sitting exactly on the step boundary
                    // collapses the second fragment; the condition has
                    // already been applied at that instant.

                    self.evolver.set_step(dt)?;
                }
            }
            if !a.is_finite() {
                return Err(Error::NumericalFailure(format!(
                    "non-finite solution entries after the step ending at t = {next}"
                )));
            }
            t = next;
        }
        Ok(())
    }
}
