//! Step conditions.
//!
//! A step condition transforms the solution vector in place between time
//! steps: flooring it at intrinsic value (American exercise), locking in a
//! discounted intrinsic (shout), or shifting it across an ex-dividend jump.
//! The rollback driver applies the condition after every advance and at
//! every stopping time.

use qf_core::{
    ensure,
    errors::Result,
    Rate, Real, Time,
};
use qf_math::{close, Array, Interpolation1D, LinearInterpolation};

/// Tolerance for matching a condition's registered instants against the
/// times the rollback driver passes in.
const TIME_MATCH: Time = 1.0e-10;

/// An in-place transformation of the solution vector at a given time.
pub trait StepCondition: std::fmt::Debug + Send + Sync {
    /// Transform `a`, the discretised option values at time `t`.
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()>;
}

/// The identity condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCondition;

impl StepCondition for NullCondition {
    fn apply_to(&self, _a: &mut Array, _t: Time) -> Result<()> {
        Ok(())
    }
}

/// American early exercise: `v[i] ← max(v[i], intrinsic[i])`.
#[derive(Debug, Clone)]
pub struct AmericanCondition {
    intrinsic: Array,
}

impl AmericanCondition {
    /// Create from the intrinsic values on the grid.
    pub fn new(intrinsic: Array) -> Self {
        Self { intrinsic }
    }
}

impl StepCondition for AmericanCondition {
    fn apply_to(&self, a: &mut Array, _t: Time) -> Result<()> {
        ensure!(
            a.size() == self.intrinsic.size(),
            "solution vector of size {} does not match intrinsic values of size {}",
            a.size(),
            self.intrinsic.size()
        );
        for (v, &floor) in a.iter_mut().zip(self.intrinsic.iter()) {
            if *v < floor {
                *v = floor;
            }
        }
        Ok(())
    }
}

/// Shout option: the holder may lock in the current intrinsic value, paid
/// at expiry, so `v[i] ← max(v[i], e^{−r(T−t)}·intrinsic[i])`.
#[derive(Debug, Clone)]
pub struct ShoutCondition {
    intrinsic: Array,
    residual_time: Time,
    rate: Rate,
}

impl ShoutCondition {
    /// Create from the intrinsic values, time to expiry, and the flat
    /// discounting rate.
    pub fn new(intrinsic: Array, residual_time: Time, rate: Rate) -> Self {
        Self {
            intrinsic,
            residual_time,
            rate,
        }
    }
}

impl StepCondition for ShoutCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        ensure!(
            a.size() == self.intrinsic.size(),
            "solution vector of size {} does not match intrinsic values of size {}",
            a.size(),
            self.intrinsic.size()
        );
        let discount = (-self.rate * (self.residual_time - t)).exp();
        for (v, &intrinsic) in a.iter_mut().zip(self.intrinsic.iter()) {
            let locked = discount * intrinsic;
            if *v < locked {
                *v = locked;
            }
        }
        Ok(())
    }
}

/// Discrete cash dividends: rolling backward across an ex-dividend instant,
/// the pre-dividend value at asset price `s` equals the post-dividend value
/// at `s − D`, recovered from the grid by linear interpolation.
#[derive(Debug, Clone)]
pub struct DividendCondition {
    asset_grid: Vec<Real>,
    amounts: Vec<Real>,
    times: Vec<Time>,
}

impl DividendCondition {
    /// Create from the asset-price grid and parallel amount/time vectors.
    pub fn new(asset_grid: Vec<Real>, amounts: Vec<Real>, times: Vec<Time>) -> Result<Self> {
        ensure!(
            amounts.len() == times.len(),
            "{} dividend amounts but {} ex-dividend times",
            amounts.len(),
            times.len()
        );
        ensure!(
            asset_grid.windows(2).all(|w| w[0] < w[1]),
            "asset grid must be strictly increasing"
        );
        Ok(Self {
            asset_grid,
            amounts,
            times,
        })
    }

    fn dividend_at(&self, t: Time) -> Option<Real> {
        self.times
            .iter()
            .position(|&s| close(s, t, TIME_MATCH))
            .map(|k| self.amounts[k])
    }
}

impl StepCondition for DividendCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(amount) = self.dividend_at(t) else {
            return Ok(());
        };
        ensure!(
            a.size() == self.asset_grid.len(),
            "solution vector of size {} does not match grid of size {}",
            a.size(),
            self.asset_grid.len()
        );
        let values = LinearInterpolation::new(&self.asset_grid, a.as_slice())?;
        let floor = self.asset_grid[0];
        for (i, v) in a.iter_mut().enumerate() {
            let shifted = (self.asset_grid[i] - amount).max(floor);
            *v = values.value(shifted);
        }
        Ok(())
    }
}

/// Several conditions applied in order.
#[derive(Debug, Default)]
pub struct StepConditionSet(Vec<Box<dyn StepCondition>>);

impl StepConditionSet {
    /// Create from the conditions to apply, first to last.
    pub fn new(conditions: Vec<Box<dyn StepCondition>>) -> Self {
        Self(conditions)
    }
}

impl StepCondition for StepConditionSet {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        for condition in &self.0 {
            condition.apply_to(a, t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_condition_is_identity() {
        let mut a = Array::from_slice(&[1.0, -2.0, 3.0]);
        let before = a.clone();
        NullCondition.apply_to(&mut a, 0.5).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn american_floors_at_intrinsic() {
        let intrinsic = Array::from_slice(&[5.0, 2.0, 0.0]);
        let condition = AmericanCondition::new(intrinsic);
        let mut a = Array::from_slice(&[4.0, 3.0, -1.0]);
        condition.apply_to(&mut a, 0.3).unwrap();
        assert_eq!(a.as_slice(), &[5.0, 3.0, 0.0]);
    }

    #[test]
    fn american_is_idempotent() {
        let condition = AmericanCondition::new(Array::from_slice(&[1.0, 2.0]));
        let mut a = Array::from_slice(&[0.0, 5.0]);
        condition.apply_to(&mut a, 0.0).unwrap();
        let once = a.clone();
        condition.apply_to(&mut a, 0.0).unwrap();
        assert_eq!(a, once);
    }

    #[test]
    fn american_checks_sizes() {
        let condition = AmericanCondition::new(Array::new(3));
        let mut a = Array::new(4);
        assert!(condition.apply_to(&mut a, 0.0).is_err());
    }

    #[test]
    fn shout_discounts_the_locked_value() {
        let intrinsic = Array::from_slice(&[10.0, 0.0]);
        let condition = ShoutCondition::new(intrinsic, 1.0, 0.05);
        let mut a = Array::from_slice(&[0.0, 0.0]);
        condition.apply_to(&mut a, 0.5).unwrap();
        let expected = 10.0 * (-0.05_f64 * 0.5).exp();
        assert!((a[0] - expected).abs() < 1e-12);
        assert_eq!(a[1], 0.0);
    }

    #[test]
    fn shout_at_expiry_locks_full_intrinsic() {
        let condition = ShoutCondition::new(Array::from_slice(&[3.0]), 1.0, 0.10);
        let mut a = Array::from_slice(&[0.0]);
        condition.apply_to(&mut a, 1.0).unwrap();
        assert!((a[0] - 3.0).abs() < 1e-15);
    }

    #[test]
    fn dividend_shifts_by_interpolation() {
        // Values linear in s: v(s) = 2 s.  After a dividend of 10 the new
        // value is v(s − 10) = 2 s − 20 wherever s − 10 is inside the grid.
        let grid: Vec<Real> = (0..11).map(|i| 50.0 + 10.0 * i as Real).collect();
        let condition = DividendCondition::new(grid.clone(), vec![10.0], vec![0.5]).unwrap();
        let mut a = Array::from_fn(11, |i| 2.0 * grid[i]);
        condition.apply_to(&mut a, 0.5).unwrap();
        for i in 1..11 {
            assert!(
                (a[i] - (2.0 * grid[i] - 20.0)).abs() < 1e-10,
                "node {i}: got {}",
                a[i]
            );
        }
        // The lowest node is clamped to the grid edge.
        assert!((a[0] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn dividend_fires_only_at_registered_times() {
        let grid: Vec<Real> = (0..5).map(|i| 50.0 + 10.0 * i as Real).collect();
        let condition = DividendCondition::new(grid.clone(), vec![5.0], vec![0.5]).unwrap();
        let mut a = Array::from_fn(5, |i| grid[i]);
        let before = a.clone();
        condition.apply_to(&mut a, 0.25).unwrap();
        assert_eq!(a, before);
        condition.apply_to(&mut a, 0.5).unwrap();
        assert!(a != before);
    }

    #[test]
    fn condition_set_applies_in_order() {
        let grid: Vec<Real> = (0..5).map(|i| 80.0 + 10.0 * i as Real).collect();
        let intrinsic = Array::from_fn(5, |i| (100.0 - grid[i]).max(0.0));
        let set = StepConditionSet::new(vec![
            Box::new(DividendCondition::new(grid.clone(), vec![5.0], vec![0.5]).unwrap()),
            Box::new(AmericanCondition::new(intrinsic.clone())),
        ]);
        let mut a = Array::new(5);
        set.apply_to(&mut a, 0.5).unwrap();
        // After the zero solution is shifted (still zero), the American
        // floor must hold everywhere.
        for i in 0..5 {
            assert!(a[i] >= intrinsic[i] - 1e-12);
        }
    }
}
