//! Expected-value growth simulator over referral cohorts.
//!
//! Models daily referral production as a discrete-time branching process:
//! each day's expected output becomes the next day's input cohort. All
//! arithmetic is continuous (expected values); nothing is sampled, so the
//! same parameters always produce the same series.

use serde::{Deserialize, Serialize};

/// Default expected size of the day-0 cohort.
pub const DEFAULT_INITIAL_PARTICIPANTS: f64 = 100.0;

/// Default lifetime referral capacity per participant.
pub const DEFAULT_REFERRAL_CAPACITY: u32 = 10;

/// Hard cap on simulated days for open-ended target searches.
pub const MAX_SIMULATED_DAYS: u32 = 10_000;

/// Daily expected growth below this is treated as ceased.
pub const NEGLIGIBLE_GROWTH: f64 = 1e-12;

/// Default tolerance when comparing cumulative totals against a target.
pub const TARGET_EPSILON: f64 = 1e-9;

/// Scale for the fixed 9-decimal rounding of recorded cumulatives.
/// Rounding keeps float drift from reading as perpetual tiny growth once
/// the process has effectively died out.
const CUMULATIVE_SCALE: f64 = 1e9;

/// Cohort of participants born on the same simulated day.
#[derive(Debug, Clone, Copy)]
struct Cohort {
    /// Day the cohort was born (0 = the initial cohort).
    birth: u32,
    /// Expected participant count.
    size: f64,
}

/// Parameters of the expected-value growth model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthModel {
    /// Expected size of the day-0 cohort.
    pub initial_participants: f64,
    /// Lifetime referral capacity per participant. At least 1.
    pub capacity: u32,
}

impl GrowthModel {
    /// Create a model. Capacity is clamped to at least 1 so the binomial
    /// recurrence stays well-defined.
    pub fn new(initial_participants: f64, capacity: u32) -> Self {
        Self {
            initial_participants,
            capacity: capacity.max(1),
        }
    }

    /// Cumulative expected referrals for days `1..=days`.
    ///
    /// Each recorded value is rounded to 9 decimals. Once a day's growth
    /// drops below [`NEGLIGIBLE_GROWTH`], the remaining days are filled
    /// with the final total and cohort bookkeeping stops.
    pub fn simulate(&self, p: f64, days: u32) -> Vec<f64> {
        let mut cohorts = vec![Cohort {
            birth: 0,
            size: self.initial_participants,
        }];
        let mut cumulative = 0.0;
        let mut series = Vec::with_capacity(days as usize);

        for day in 1..=days {
            let new_refs = self.expected_new_referrals(&cohorts, day, p);
            cumulative += new_refs;
            series.push(round_cumulative(cumulative));

            if new_refs > NEGLIGIBLE_GROWTH {
                cohorts.push(Cohort {
                    birth: day,
                    size: new_refs,
                });
            }
            if new_refs < NEGLIGIBLE_GROWTH {
                // Growth has ceased; freeze the remaining days.
                let last = round_cumulative(cumulative);
                while series.len() < days as usize {
                    series.push(last);
                }
                break;
            }
        }

        series
    }

    /// First day on which the cumulative total reaches `target`, within
    /// the default tolerance and day cap. `None` when growth ceases first
    /// or the cap is exceeded.
    pub fn days_to_target(&self, p: f64, target: f64) -> Option<u32> {
        self.days_to_target_within(p, target, TARGET_EPSILON, MAX_SIMULATED_DAYS)
    }

    /// `days_to_target` with explicit comparison tolerance and day cap.
    ///
    /// Steps the recurrence day by day without materializing a series and
    /// without per-day rounding; the incentive solver threads its own
    /// epsilon through here.
    pub fn days_to_target_within(
        &self,
        p: f64,
        target: f64,
        epsilon: f64,
        max_days: u32,
    ) -> Option<u32> {
        let mut cohorts = vec![Cohort {
            birth: 0,
            size: self.initial_participants,
        }];
        let mut cumulative = 0.0;

        for day in 1..=max_days {
            let new_refs = self.expected_new_referrals(&cohorts, day, p);
            cumulative += new_refs;

            if cumulative >= target - epsilon {
                return Some(day);
            }
            if new_refs < NEGLIGIBLE_GROWTH {
                return None;
            }
            cohorts.push(Cohort {
                birth: day,
                size: new_refs,
            });
        }

        None
    }

    /// Expected referrals produced on `day` across all cohorts born before it.
    fn expected_new_referrals(&self, cohorts: &[Cohort], day: u32, p: f64) -> f64 {
        let mut new_refs = 0.0;
        for cohort in cohorts {
            // Cohorts born today or later contribute nothing yet.
            if day <= cohort.birth {
                continue;
            }
            let days_active = day - cohort.birth - 1;
            new_refs += cohort.size * active_fraction(days_active, p, self.capacity) * p;
        }
        new_refs
    }
}

impl Default for GrowthModel {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_PARTICIPANTS, DEFAULT_REFERRAL_CAPACITY)
    }
}

/// Probability a participant is still active after `days_active` days:
/// P[Binomial(days_active, p) <= capacity - 1].
///
/// Uses the iterative pmf recurrence `pmf(k) = pmf(k-1) * (t-k+1)/k *
/// p/(1-p)` starting from `pmf(0) = (1-p)^t`, so no factorials overflow.
/// The recurrence needs `0 < p < 1`; the boundary cases are handled
/// directly: zero days active (or p <= 0) never exhausts capacity, and
/// p >= 1 exhausts it on exactly the `capacity`-th day.
pub fn active_fraction(days_active: u32, p: f64, capacity: u32) -> f64 {
    let capacity = capacity.max(1);

    if days_active == 0 || p <= 0.0 {
        return 1.0;
    }
    if p >= 1.0 {
        return if days_active < capacity { 1.0 } else { 0.0 };
    }

    let t = days_active;
    let q = 1.0 - p;
    let mut pmf = q.powi(t as i32);
    let mut sum = pmf;

    let k_max = t.min(capacity - 1);
    for k in 1..=k_max {
        pmf *= (t - (k - 1)) as f64 / k as f64 * (p / q);
        sum += pmf;
    }

    sum.clamp(0.0, 1.0)
}

/// Round to the fixed 9-decimal precision used for recorded cumulatives.
fn round_cumulative(value: f64) -> f64 {
    (value * CUMULATIVE_SCALE).round() / CUMULATIVE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Direct binomial CDF via factorial-free products, for cross-checks.
    fn binom_cdf(t: u32, p: f64, k_max: u32) -> f64 {
        let mut total = 0.0;
        for k in 0..=k_max.min(t) {
            // C(t, k) computed incrementally
            let mut coeff = 1.0;
            for i in 0..k {
                coeff *= (t - i) as f64 / (i + 1) as f64;
            }
            total += coeff * p.powi(k as i32) * (1.0 - p).powi((t - k) as i32);
        }
        total
    }

    #[test]
    fn test_active_fraction_boundaries() {
        // Day zero: always active
        assert_eq!(active_fraction(0, 0.5, 10), 1.0);
        // Zero probability: capacity never exhausts
        assert_eq!(active_fraction(100, 0.0, 10), 1.0);
        // Certain success: exhausted exactly at capacity days
        assert_eq!(active_fraction(9, 1.0, 10), 1.0);
        assert_eq!(active_fraction(10, 1.0, 10), 0.0);
        // Degenerate capacity clamps to 1
        assert_eq!(active_fraction(0, 0.5, 0), 1.0);
    }

    #[test]
    fn test_active_fraction_matches_direct_cdf() {
        for &(t, p, cap) in &[(5u32, 0.3, 3u32), (10, 0.1, 10), (20, 0.5, 4), (1, 0.9, 1)] {
            let recurrence = active_fraction(t, p, cap);
            let direct = binom_cdf(t, p, cap - 1);
            assert!(
                (recurrence - direct).abs() < 1e-10,
                "t={t} p={p} cap={cap}: {recurrence} vs {direct}"
            );
        }
    }

    #[test]
    fn test_active_fraction_monotone_in_days() {
        let mut prev = 1.0;
        for t in 0..50 {
            let frac = active_fraction(t, 0.2, 5);
            assert!(frac <= prev + 1e-12, "not monotone at t={t}");
            prev = frac;
        }
    }

    #[test]
    fn test_simulate_zero_days_is_empty() {
        let model = GrowthModel::default();
        assert!(model.simulate(0.1, 0).is_empty());
    }

    #[test]
    fn test_simulate_is_non_decreasing() {
        let model = GrowthModel::default();
        let series = model.simulate(0.1, 60);
        assert_eq!(series.len(), 60);
        for window in series.windows(2) {
            assert!(window[1] >= window[0]);
        }
    }

    #[test]
    fn test_simulate_first_day_value() {
        // Day 1: the initial cohort alone contributes initial * p
        let model = GrowthModel::new(100.0, 10);
        let series = model.simulate(0.1, 1);
        assert_eq!(series.len(), 1);
        assert!((series[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulate_zero_probability_stays_flat() {
        let model = GrowthModel::default();
        let series = model.simulate(0.0, 30);
        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_simulate_backfills_after_growth_ceases() {
        // Capacity 1 with p = 1: everyone refers once on day 1, the new
        // cohort refers once on day 2, and so on - growth never ceases.
        // With p tiny the process dies fast instead.
        let model = GrowthModel::new(1.0, 1);
        let series = model.simulate(1e-14, 10);
        assert_eq!(series.len(), 10);
        let last = series[series.len() - 1];
        assert!(series.iter().all(|&c| c == last));
    }

    #[test]
    fn test_days_to_target_composes_with_simulate() {
        let model = GrowthModel::default();
        let target = 500.0;
        let day = model.days_to_target(0.1, target).expect("reachable");

        let series = model.simulate(0.1, day);
        assert!(series[(day - 1) as usize] >= target - 1e-6);
        if day > 1 {
            assert!(series[(day - 2) as usize] < target);
        }
    }

    #[test]
    fn test_days_to_target_unreachable_when_growth_dies() {
        let model = GrowthModel::default();
        // p = 0: nothing is ever produced
        assert_eq!(model.days_to_target(0.0, 10.0), None);
        // ...but a zero target is already met on day 1
        assert_eq!(model.days_to_target(0.0, 0.0), Some(1));
    }

    #[test]
    fn test_days_to_target_respects_cap() {
        let model = GrowthModel::new(1.0, 1);
        // Chain growth of exactly one referral per day reaches 20 000
        // only past the 10 000-day cap.
        assert_eq!(model.days_to_target(1.0, 20_000.0), None);
    }

    #[test]
    fn test_simulate_deterministic() {
        let model = GrowthModel::default();
        assert_eq!(model.simulate(0.25, 90), model.simulate(0.25, 90));
    }

    proptest! {
        #[test]
        fn prop_simulate_non_decreasing(p in 0.0f64..1.0, days in 1u32..120) {
            let model = GrowthModel::default();
            let series = model.simulate(p, days);
            prop_assert_eq!(series.len(), days as usize);
            for window in series.windows(2) {
                prop_assert!(window[1] >= window[0]);
            }
        }

        #[test]
        fn prop_active_fraction_is_probability(t in 0u32..200, p in 0.0f64..=1.0, cap in 1u32..20) {
            let frac = active_fraction(t, p, cap);
            prop_assert!((0.0..=1.0).contains(&frac));
        }

        #[test]
        fn prop_days_to_target_consistent(p in 0.05f64..0.9, target in 1.0f64..2000.0) {
            let model = GrowthModel::default();
            if let Some(day) = model.days_to_target(p, target) {
                let series = model.simulate(p, day);
                prop_assert!(series[(day - 1) as usize] >= target - 1e-6);
            }
        }
    }
}
