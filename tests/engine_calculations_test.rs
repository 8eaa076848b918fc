/// End-to-end accuracy tests for the signal engine's arithmetic: entry
/// classification, metric aggregation, health banding and scoring, reward
/// benefit projection, and deal valuation.
///
/// The formulas are reproduced locally so the suite pins the intended
/// numbers independently of the crate internals.

// ---------------------------------------------------------------------------
// Ledger classification and normalization
// ---------------------------------------------------------------------------

#[cfg(test)]
mod ledger_normalization {
    fn monthly_factor(frequency: &str) -> f64 {
        match frequency {
            "weekly" => 4.33,
            "biweekly" => 2.17,
            "monthly" => 1.0,
            "one_time" => 0.0,
            _ => 0.0,
        }
    }

    #[test]
    fn test_weekly_normalization() {
        // 1000/week -> 4330/month
        assert!((1000.0 * monthly_factor("weekly") - 4330.0).abs() < 1e-9);
    }

    #[test]
    fn test_biweekly_normalization() {
        assert!((2000.0 * monthly_factor("biweekly") - 4340.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_time_contributes_nothing() {
        assert_eq!(50000.0 * monthly_factor("one_time"), 0.0);
    }

    #[test]
    fn test_unrecognized_frequency_contributes_nothing() {
        assert_eq!(1000.0 * monthly_factor("quarterly"), 0.0);
    }
}

// ---------------------------------------------------------------------------
// Financial metric aggregation
// ---------------------------------------------------------------------------

#[cfg(test)]
mod metric_aggregation {
    fn clamped_ratio(numerator: f64, denominator: f64) -> f64 {
        if denominator <= 0.0 {
            0.0
        } else {
            (numerator / denominator).clamp(0.0, 1.0)
        }
    }

    fn savings_rate(income: f64, expenses: f64, loans: f64, investments: f64) -> f64 {
        let savings = (income - expenses - loans - investments).max(0.0);
        clamped_ratio(savings, income)
    }

    #[test]
    fn test_savings_rate_typical() {
        // income 100k, expenses 60k, loans 10k, investments 10k -> 20% saved
        let sr = savings_rate(100_000.0, 60_000.0, 10_000.0, 10_000.0);
        assert!((sr - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_savings_rate_floored_at_zero() {
        // Spending over income never yields a negative rate.
        let sr = savings_rate(50_000.0, 60_000.0, 0.0, 0.0);
        assert_eq!(sr, 0.0);
    }

    #[test]
    fn test_zero_income_yields_zero_ratios() {
        assert_eq!(savings_rate(0.0, 10_000.0, 0.0, 0.0), 0.0);
        assert_eq!(clamped_ratio(30_000.0, 0.0), 0.0);
    }

    #[test]
    fn test_utilization_clamped_at_one() {
        // Balance over limit reports 100%, not more.
        assert_eq!(clamped_ratio(120_000.0, 100_000.0), 1.0);
    }

    #[test]
    fn test_utilization_typical() {
        assert!((clamped_ratio(30_000.0, 100_000.0) - 0.30).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Health banding and scoring
// ---------------------------------------------------------------------------

#[cfg(test)]
mod health_classification {
    #[derive(Debug, PartialEq)]
    enum Band {
        Unknown,
        Critical,
        Stressed,
        Balanced,
        Optimizer,
    }

    fn classify(income: f64, sr: f64, util: f64, dti: f64) -> Band {
        if income <= 0.0 {
            Band::Unknown
        } else if sr < 0.10 || util > 0.80 || dti > 0.50 {
            Band::Critical
        } else if sr < 0.20 || util > 0.50 || dti > 0.30 {
            Band::Stressed
        } else if sr < 0.30 || util > 0.30 {
            Band::Balanced
        } else {
            Band::Optimizer
        }
    }

    #[test]
    fn test_zero_income_is_unknown_regardless_of_other_metrics() {
        assert_eq!(classify(0.0, 0.5, 0.9, 0.9), Band::Unknown);
    }

    #[test]
    fn test_any_critical_trigger_wins() {
        assert_eq!(classify(50_000.0, 0.05, 0.10, 0.10), Band::Critical);
        assert_eq!(classify(50_000.0, 0.50, 0.85, 0.10), Band::Critical);
        assert_eq!(classify(50_000.0, 0.50, 0.10, 0.55), Band::Critical);
    }

    #[test]
    fn test_boundary_values_are_not_critical() {
        // Thresholds are strict: exactly 0.10 / 0.80 / 0.50 fall through.
        assert_ne!(classify(50_000.0, 0.10, 0.80, 0.50), Band::Critical);
    }

    #[test]
    fn test_healthy_profile_is_optimizer() {
        assert_eq!(classify(50_000.0, 0.35, 0.20, 0.10), Band::Optimizer);
    }

    #[test]
    fn test_mid_savings_is_balanced() {
        assert_eq!(classify(50_000.0, 0.25, 0.10, 0.10), Band::Balanced);
    }
}

// ---------------------------------------------------------------------------
// Reward benefit projection
// ---------------------------------------------------------------------------

#[cfg(test)]
mod reward_projection {
    /// Annual net benefit of a card for one category of monthly spend.
    fn net_benefit(monthly_spend: f64, reward_rate_pct: f64, annual_fee: f64) -> f64 {
        monthly_spend * 12.0 * reward_rate_pct / 100.0 - annual_fee
    }

    #[test]
    fn test_net_benefit_positive() {
        // 10k/month at 5% with a 1000 fee -> 6000 - 1000 = 5000/year
        assert!((net_benefit(10_000.0, 5.0, 1_000.0) - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_fee_can_make_benefit_negative() {
        assert!(net_benefit(1_000.0, 2.0, 500.0) < 0.0);
    }

    #[test]
    fn test_recommendation_score_capped_at_100() {
        let score = |monthly_savings: f64| (monthly_savings / 100.0 * 10.0_f64).min(100.0);
        assert_eq!(score(500.0), 50.0);
        assert_eq!(score(2_000.0), 100.0);
    }

    #[test]
    fn test_priority_tiers() {
        let priority = |monthly: f64| {
            if monthly >= 500.0 {
                9
            } else if monthly >= 200.0 {
                7
            } else {
                5
            }
        };
        assert_eq!(priority(600.0), 9);
        assert_eq!(priority(500.0), 9);
        assert_eq!(priority(250.0), 7);
        assert_eq!(priority(100.0), 5);
    }
}

// ---------------------------------------------------------------------------
// Deal valuation
// ---------------------------------------------------------------------------

#[cfg(test)]
mod deal_valuation {
    fn percentage_value(txn: f64, pct: f64, cap: Option<f64>) -> f64 {
        let raw = txn * pct / 100.0;
        match cap {
            Some(c) => raw.min(c),
            None => raw,
        }
    }

    #[test]
    fn test_cashback_hits_cap() {
        // 10% of 1000 capped at 50
        assert_eq!(percentage_value(1_000.0, 10.0, Some(50.0)), 50.0);
    }

    #[test]
    fn test_cashback_below_cap() {
        assert_eq!(percentage_value(400.0, 10.0, Some(50.0)), 40.0);
    }

    #[test]
    fn test_points_quarter_unit_value() {
        let points_value = 400.0 * 0.25;
        assert_eq!(points_value, 100.0);
    }

    #[test]
    fn test_popularity_weighting() {
        // redemptions x10 + clicks x2 + views x1
        let popularity = |views: i64, clicks: i64, redemptions: i64| {
            (redemptions * 10 + clicks * 2 + views) as f64
        };
        assert_eq!(popularity(10, 5, 3), 50.0);
        // A redemption outweighs any mix of 9 views/clicks.
        assert!(popularity(0, 0, 1) > popularity(4, 2, 0));
    }
}
