//! Incentive solver: smallest bonus meeting a hiring target on time.
//!
//! The adoption curve (bonus -> daily referral probability) is supplied by
//! the caller, assumed monotone non-decreasing. The solver exploits that
//! monotonicity: an exponential bracket finds an upper bound, then a
//! binary search over multiples of [`BONUS_STEP`] narrows to the minimum.

use super::growth::{GrowthModel, MAX_SIMULATED_DAYS};

/// Largest bonus the solver will consider, in dollars.
pub const MAX_BONUS: u64 = 1_000_000;

/// Bonuses are quoted in multiples of this, in dollars.
pub const BONUS_STEP: u64 = 10;

impl GrowthModel {
    /// Minimum bonus (a multiple of [`BONUS_STEP`]) whose adoption
    /// probability reaches `target_hires` within `day_budget` days, or
    /// `None` when even [`MAX_BONUS`] falls short.
    ///
    /// `adoption_prob` maps a bonus to the daily referral probability;
    /// it must be monotone non-decreasing for the search to be sound.
    /// `epsilon` is the tolerance applied when comparing the simulated
    /// cumulative total against the target.
    pub fn min_bonus_for_target<F>(
        &self,
        day_budget: u32,
        target_hires: f64,
        adoption_prob: F,
        epsilon: f64,
    ) -> Option<u64>
    where
        F: Fn(u64) -> f64,
    {
        let meets_budget = |bonus: u64| {
            self.days_to_target_within(adoption_prob(bonus), target_hires, epsilon, MAX_SIMULATED_DAYS)
                .map_or(false, |days| days <= day_budget)
        };

        // Exponential bracket: find the first power-of-two bonus that works.
        let mut low: u64 = 0;
        let mut high: u64 = BONUS_STEP;
        while high <= MAX_BONUS {
            if meets_budget(high) {
                break;
            }
            low = high;
            high *= 2;
        }
        if high > MAX_BONUS {
            return None;
        }

        // Binary search on the step grid within (low, high].
        let mut answer = None;
        while low <= high {
            let mid = (low + high) / 2 / BONUS_STEP * BONUS_STEP;
            if meets_budget(mid) {
                answer = Some(mid);
                if mid < BONUS_STEP {
                    break;
                }
                high = mid - BONUS_STEP;
            } else {
                low = mid + BONUS_STEP;
            }
        }

        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::growth::TARGET_EPSILON;

    /// Saturating adoption curve used by the reference service.
    fn default_adoption(bonus: u64) -> f64 {
        (1.0 - (-(bonus as f64) / 250.0).exp()).clamp(0.01, 0.95)
    }

    #[test]
    fn test_zero_adoption_is_unsolvable() {
        let model = GrowthModel::default();
        let result = model.min_bonus_for_target(30, 500.0, |_| 0.0, TARGET_EPSILON);
        assert_eq!(result, None);
    }

    #[test]
    fn test_result_is_multiple_of_step_and_meets_budget() {
        let model = GrowthModel::default();
        let bonus = model
            .min_bonus_for_target(30, 800.0, default_adoption, TARGET_EPSILON)
            .expect("target is reachable under the default curve");

        assert_eq!(bonus % BONUS_STEP, 0);

        let days = model
            .days_to_target_within(
                default_adoption(bonus),
                800.0,
                TARGET_EPSILON,
                MAX_SIMULATED_DAYS,
            )
            .expect("solution must reach the target");
        assert!(days <= 30);
    }

    #[test]
    fn test_result_is_minimal() {
        let model = GrowthModel::default();
        let bonus = model
            .min_bonus_for_target(30, 800.0, default_adoption, TARGET_EPSILON)
            .expect("reachable");

        if bonus >= BONUS_STEP {
            let below = bonus - BONUS_STEP;
            let met = model
                .days_to_target_within(
                    default_adoption(below),
                    800.0,
                    TARGET_EPSILON,
                    MAX_SIMULATED_DAYS,
                )
                .map_or(false, |days| days <= 30);
            assert!(!met, "bonus {below} below the answer also meets the budget");
        }
    }

    #[test]
    fn test_zero_bonus_when_baseline_suffices() {
        // The default curve floors at p = 0.01, which is already enough
        // for a tiny target over a generous budget.
        let model = GrowthModel::default();
        let bonus = model.min_bonus_for_target(300, 10.0, default_adoption, TARGET_EPSILON);
        assert_eq!(bonus, Some(0));
    }

    #[test]
    fn test_step_adoption_finds_threshold() {
        // Adoption jumps from useless to strong at exactly 500.
        let model = GrowthModel::default();
        let curve = |bonus: u64| if bonus >= 500 { 0.5 } else { 0.0 };
        let found = model.min_bonus_for_target(30, 500.0, curve, TARGET_EPSILON);
        assert_eq!(found, Some(500));
    }

    #[test]
    fn test_unreachable_within_budget_is_none() {
        // Even p = 0.95 cannot produce a million hires in two days.
        let model = GrowthModel::default();
        let result = model.min_bonus_for_target(2, 1_000_000.0, default_adoption, TARGET_EPSILON);
        assert_eq!(result, None);
    }
}
