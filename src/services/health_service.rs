//! Health classification: metrics → band, completeness + band → scenario
//! code, and the 0–100 display score. All pure; recomputed from scratch on
//! every call with no memory of prior results.

use crate::models::{FinancialMetrics, HealthBand, ScenarioCode};

/// Inputs to the scenario gating that are not part of the metrics proper.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessSignals {
    pub has_income_records: bool,
    pub has_card_records: bool,
    pub has_basic_profile: bool,
    pub has_expense_data: bool,
    pub bank_linked: bool,
    pub email_linked: bool,
}

/// Ordered threshold checks, most severe first; first match wins.
/// Unknown is reachable only when income is 0.
pub fn classify_band(metrics: &FinancialMetrics) -> HealthBand {
    if metrics.monthly_income <= 0.0 {
        return HealthBand::Unknown;
    }

    let sr = metrics.savings_rate;
    let util = metrics.credit_utilization;
    let dti = metrics.debt_to_income_ratio;

    if sr < 0.10 || util > 0.80 || dti > 0.50 {
        HealthBand::Critical
    } else if sr < 0.20 || util > 0.50 || dti > 0.30 {
        HealthBand::Stressed
    } else if sr < 0.30 || util > 0.30 {
        HealthBand::Balanced
    } else {
        HealthBand::Optimizer
    }
}

/// Data-completeness gating runs before health is consulted: a user with no
/// income records is always OnboardingNoSalary even when a band would be
/// computable.
pub fn classify_scenario(signals: &CompletenessSignals, band: HealthBand) -> ScenarioCode {
    if !signals.has_income_records {
        return ScenarioCode::OnboardingNoSalary;
    }
    if !signals.has_card_records {
        return ScenarioCode::OnboardingNoCards;
    }

    let completeness = [
        signals.has_basic_profile,
        signals.has_expense_data,
        signals.bank_linked,
        signals.email_linked,
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    if completeness < 2 {
        return ScenarioCode::OnboardingPartial;
    }

    match band {
        HealthBand::Unknown => ScenarioCode::ReadyNoHealth,
        HealthBand::Critical => ScenarioCode::CriticalRed,
        HealthBand::Stressed => ScenarioCode::StressedAmber,
        HealthBand::Balanced => ScenarioCode::BalancedGreen,
        HealthBand::Optimizer => ScenarioCode::OptimizerBlue,
    }
}

/// Display-only weighted score, independent of the band thresholds.
///
/// Income presence is scored through two separate gates (+15 and +10, both
/// keyed off income > 0). The duplication is preserved deliberately;
/// collapsing it would change every score downstream.
pub fn health_score(metrics: &FinancialMetrics) -> f64 {
    let mut score: f64 = 0.0;

    let sr = metrics.savings_rate;
    if sr >= 0.3 {
        score += 30.0;
    } else if sr >= 0.2 {
        score += 20.0;
    } else if sr >= 0.1 {
        score += 10.0;
    }

    let util = metrics.credit_utilization;
    if util <= 0.3 {
        score += 25.0;
    } else if util <= 0.5 {
        score += 15.0;
    } else if util <= 0.7 {
        score += 8.0;
    }

    let dti = metrics.debt_to_income_ratio;
    if dti <= 0.3 {
        score += 20.0;
    } else if dti <= 0.4 {
        score += 15.0;
    } else if dti <= 0.5 {
        score += 8.0;
    }

    if metrics.monthly_income > 0.0 {
        score += 15.0;
    }
    if metrics.monthly_income > 0.0 {
        score += 10.0;
    }

    score.min(100.0)
}
