//! Cross-module tests for the growth simulator and incentive solver.
//!
//! The unit tests pin the cohort recurrence in isolation; these validate
//! the properties the two halves must agree on:
//! 1. Series shape: length, monotonicity, prefix stability
//! 2. Day counting against the cumulative series
//! 3. Solver results replayed through the simulator

use referral_kernel::{GrowthModel, BONUS_STEP, MAX_SIMULATED_DAYS};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Exponential-saturation adoption curve clamped to [0.01, 0.95], the same
/// shape the HTTP layer wires into the solver by default.
fn adoption(bonus: u64) -> f64 {
    (1.0 - (-(bonus as f64) / 250.0).exp()).clamp(0.01, 0.95)
}

fn meets_budget(model: &GrowthModel, bonus: u64, day_budget: u32, target: f64) -> bool {
    model
        .days_to_target_within(adoption(bonus), target, 1e-3, MAX_SIMULATED_DAYS)
        .map_or(false, |days| days <= day_budget)
}

// ─────────────────────────────────────────────────────────────────────────────
// Series Shape
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_series_is_monotone_and_sized() {
    let model = GrowthModel::default();

    for p in [0.0, 0.1, 0.5, 0.95] {
        let series = model.simulate(p, 120);
        assert_eq!(series.len(), 120);
        // Day one is the whole seed cohort referring at rate p.
        assert!((series[0] - 100.0 * p).abs() < 1e-9, "first day at p={p}");
        for pair in series.windows(2) {
            assert!(pair[1] >= pair[0], "series dipped at p={p}");
        }
    }
}

#[test]
fn test_series_prefix_is_stable() {
    // Extending the horizon never rewrites the days already simulated.
    let model = GrowthModel::default();

    for p in [0.0, 0.1, 0.5, 0.95] {
        let short = model.simulate(p, 30);
        let long = model.simulate(p, 60);
        assert_eq!(short[..], long[..30], "prefix differs at p={p}");
    }
}

#[test]
fn test_capacity_caps_each_participant() {
    // One seed, capacity one, certain referrals: every participant refers
    // exactly once and retires, so the network gains one user per day.
    let model = GrowthModel::new(1.0, 1);
    let series = model.simulate(1.0, 50);

    for (i, total) in series.iter().enumerate() {
        assert!((total - (i as f64 + 1.0)).abs() < 1e-9, "day {}", i + 1);
    }
}

#[test]
fn test_zero_probability_never_grows() {
    let model = GrowthModel::default();

    assert!(model.simulate(0.0, 60).iter().all(|&v| v == 0.0));
    assert_eq!(model.days_to_target(0.0, 5.0), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Day Counting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_days_to_target_agrees_with_series() {
    let model = GrowthModel::default();

    for (p, target) in [(0.05, 50.0), (0.1, 500.0), (0.3, 900.0)] {
        let day = model
            .days_to_target(p, target)
            .unwrap_or_else(|| panic!("target {target} unreachable at p={p}"));
        assert!(day >= 1);

        let series = model.simulate(p, day);
        assert!(
            series[day as usize - 1] >= target - 1e-6,
            "series below target on day {day} at p={p}"
        );
        if day >= 2 {
            assert!(
                series[day as usize - 2] < target,
                "target already met before day {day} at p={p}"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Incentive Solver
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_min_bonus_is_minimal_and_sufficient() {
    let model = GrowthModel::default();

    let bonus = model
        .min_bonus_for_target(30, 800.0, adoption, 1e-3)
        .expect("800 hires in 30 days is attainable");

    assert_eq!(bonus % BONUS_STEP, 0);
    assert!(meets_budget(&model, bonus, 30, 800.0));
    if bonus >= BONUS_STEP {
        assert!(
            !meets_budget(&model, bonus - BONUS_STEP, 30, 800.0),
            "one step cheaper should miss the deadline"
        );
    }
}

#[test]
fn test_longer_budget_never_needs_larger_bonus() {
    let model = GrowthModel::default();

    let tight = model.min_bonus_for_target(30, 800.0, adoption, 1e-3);
    let slack = model.min_bonus_for_target(60, 800.0, adoption, 1e-3);

    let (tight, slack) = (tight.unwrap(), slack.unwrap());
    assert!(slack <= tight, "slack={slack} tight={tight}");
}

#[test]
fn test_unreachable_target_returns_none() {
    let model = GrowthModel::default();

    // Even a saturated adoption rate cannot hire a million people in two
    // days, so the bracket blows past the ceiling and gives up.
    assert_eq!(model.min_bonus_for_target(2, 1_000_000.0, adoption, 1e-3), None);
}
