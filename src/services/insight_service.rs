//! Insight and next-best-action generation: independent, order-preserving
//! rule lists over the current metrics, spending aggregates, deals, and
//! recommendations. Every generator degrades to an empty list on internal
//! failure; a broken generator must never block snapshot delivery.

use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::{
    card_queries, deal_queries, insight_queries, ledger_queries, profile_queries,
    recommendation_queries, spending_queries,
};
use crate::errors::AppError;
use crate::models::{
    ActionType, CardRecommendation, Deal, FinancialMetrics, Insight, InsightCategory,
    InsightPriority, NewAction, NewInsight, NextBestAction, SpendingCategoryAggregate,
};
use crate::services::classifier::{self, EntryClass};
use crate::services::metrics_service;

const LOW_SAVINGS_RATE: f64 = 0.10;
const EXCELLENT_SAVINGS_RATE: f64 = 0.30;
const HIGH_UTILIZATION: f64 = 0.80;
const HEALTHY_UTILIZATION: f64 = 0.30;
const HIGH_DTI: f64 = 0.50;
const CATEGORY_SAVINGS_FLOOR: f64 = 200.0;
const RISING_TREND_PCT: f64 = 20.0;
const MAX_DEAL_INSIGHTS: usize = 2;
const MAX_RISING_SPEND_INSIGHTS: usize = 2;
const ACTIONABLE_SAVINGS_FLOOR: f64 = 200.0;

/// Potential monthly savings for a category: what the best recommendation
/// targeting it claims.
fn category_potential_savings(
    category: &str,
    recommendations: &[CardRecommendation],
) -> f64 {
    recommendations
        .iter()
        .filter(|r| r.category.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(category)))
        .map(|r| r.estimated_monthly_savings)
        .fold(0.0, f64::max)
}

/// Build the insight batch from already-fetched rows. Each rule is
/// independent; output order follows rule order.
pub fn build_insights(
    metrics: &FinancialMetrics,
    categories: &[SpendingCategoryAggregate],
    recommendations: &[CardRecommendation],
    featured_deals: &[Deal],
) -> Vec<NewInsight> {
    let mut insights = Vec::new();

    // Savings rules
    if metrics.monthly_income > 0.0 && metrics.savings_rate < LOW_SAVINGS_RATE {
        insights.push(NewInsight {
            category: InsightCategory::Savings,
            priority: InsightPriority::High,
            title: "Savings rate is critically low".to_string(),
            body: format!(
                "You are saving {:.0}% of your income. Aim for at least 10%.",
                metrics.savings_rate * 100.0
            ),
            value: Some(metrics.savings_rate * 100.0),
        });
    } else if metrics.savings_rate >= EXCELLENT_SAVINGS_RATE {
        insights.push(NewInsight {
            category: InsightCategory::Savings,
            priority: InsightPriority::Low,
            title: "Excellent savings discipline".to_string(),
            body: format!(
                "You are saving {:.0}% of your income, well above the 30% benchmark.",
                metrics.savings_rate * 100.0
            ),
            value: Some(metrics.savings_rate * 100.0),
        });
    }

    // Credit rules
    if metrics.credit_utilization > HIGH_UTILIZATION {
        insights.push(NewInsight {
            category: InsightCategory::Credit,
            priority: InsightPriority::High,
            title: "Credit utilization is dangerously high".to_string(),
            body: format!(
                "You are using {:.0}% of your total credit limit. Paying balances down below 30% protects your credit score.",
                metrics.credit_utilization * 100.0
            ),
            value: Some(metrics.credit_utilization * 100.0),
        });
    } else if metrics.credit_utilization > 0.0 && metrics.credit_utilization < HEALTHY_UTILIZATION {
        insights.push(NewInsight {
            category: InsightCategory::Credit,
            priority: InsightPriority::Low,
            title: "Healthy credit utilization".to_string(),
            body: format!(
                "Your utilization is {:.0}%, comfortably under the 30% guideline.",
                metrics.credit_utilization * 100.0
            ),
            value: Some(metrics.credit_utilization * 100.0),
        });
    }

    if metrics.debt_to_income_ratio > HIGH_DTI {
        insights.push(NewInsight {
            category: InsightCategory::Debt,
            priority: InsightPriority::High,
            title: "Card debt is outpacing income".to_string(),
            body: format!(
                "Your card balances are {:.0}% of monthly income. Prioritize paying them down.",
                metrics.debt_to_income_ratio * 100.0
            ),
            value: Some(metrics.debt_to_income_ratio * 100.0),
        });
    }

    // Category optimization
    for agg in categories {
        let potential = category_potential_savings(&agg.category, recommendations);
        if potential > CATEGORY_SAVINGS_FLOOR {
            insights.push(NewInsight {
                category: InsightCategory::CategoryOptimization,
                priority: InsightPriority::Medium,
                title: format!("Better rewards available for {}", agg.category),
                body: format!(
                    "A better card for {} could save you about {:.0} per month.",
                    agg.category, potential
                ),
                value: Some(potential),
            });
        }
    }

    // Featured deals in the user's top categories
    let mut deal_insights = 0;
    for deal in featured_deals {
        if deal_insights >= MAX_DEAL_INSIGHTS {
            break;
        }
        let in_top = categories
            .iter()
            .take(5)
            .any(|agg| agg.category.eq_ignore_ascii_case(&deal.category));
        if in_top {
            insights.push(NewInsight {
                category: InsightCategory::Deal,
                priority: InsightPriority::Medium,
                title: format!("Deal at {} in a category you spend on", deal.merchant),
                body: format!(
                    "{} is running a {} offer on {}.",
                    deal.merchant, deal.deal_type, deal.category
                ),
                value: Some(deal.value),
            });
            deal_insights += 1;
        }
    }

    // Rising spend warnings
    let mut rising = 0;
    for agg in categories {
        if rising >= MAX_RISING_SPEND_INSIGHTS {
            break;
        }
        if agg.trend == "up" && agg.trend_pct >= RISING_TREND_PCT {
            insights.push(NewInsight {
                category: InsightCategory::RisingSpend,
                priority: InsightPriority::High,
                title: format!("{} spending is rising fast", agg.category),
                body: format!(
                    "Your {} spend is up {:.0}% over last month.",
                    agg.category, agg.trend_pct
                ),
                value: Some(agg.trend_pct),
            });
            rising += 1;
        }
    }

    insights
}

/// Onboarding state consulted by the action rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingState {
    pub has_income_records: bool,
    pub has_card_records: bool,
    pub email_linked: bool,
}

/// Build the next-best-action batch: same signals as the insights, but each
/// row names a concrete step with a 1-10 priority.
pub fn build_actions(
    onboarding: &OnboardingState,
    recommendations: &[CardRecommendation],
    categories: &[SpendingCategoryAggregate],
) -> Vec<NewAction> {
    let mut actions = Vec::new();

    if !onboarding.has_income_records {
        actions.push(NewAction {
            action_type: ActionType::AddSalary,
            priority: 10,
            title: "Add your salary".to_string(),
            body: "Record your monthly income to unlock health tracking.".to_string(),
            value: None,
        });
    }
    if !onboarding.has_card_records {
        actions.push(NewAction {
            action_type: ActionType::AddCards,
            priority: 9,
            title: "Add your cards".to_string(),
            body: "Add your credit cards to track utilization and find better rewards.".to_string(),
            value: None,
        });
    }
    if !onboarding.email_linked {
        actions.push(NewAction {
            action_type: ActionType::LinkEmail,
            priority: 5,
            title: "Link your email".to_string(),
            body: "Linking email improves spending categorization.".to_string(),
            value: None,
        });
    }

    for rec in recommendations {
        if rec.estimated_monthly_savings > ACTIONABLE_SAVINGS_FLOOR {
            actions.push(NewAction {
                action_type: ActionType::ApplyRecommendation,
                priority: 7,
                title: format!("Consider the {}", rec.card_name),
                body: format!(
                    "Applying for the {} could save about {:.0} per month.",
                    rec.card_name, rec.estimated_monthly_savings
                ),
                value: Some(rec.estimated_monthly_savings),
            });
        }
    }

    for agg in categories {
        if agg.trend == "up" && agg.trend_pct >= RISING_TREND_PCT {
            actions.push(NewAction {
                action_type: ActionType::ReduceCategorySpend,
                priority: 5,
                title: format!("Review your {} spending", agg.category),
                body: format!(
                    "{} is up {:.0}% month over month; a budget cap could help.",
                    agg.category, agg.trend_pct
                ),
                value: Some(agg.current_month_spend),
            });
        }
    }

    actions
}

/// Regenerate the user's insight batch (clear-then-insert). Returns an empty
/// list on any internal failure.
pub async fn generate_insights(pool: &PgPool, user_id: Uuid) -> Vec<Insight> {
    match generate_insights_inner(pool, user_id).await {
        Ok(insights) => {
            info!("Generated {} insights for user {}", insights.len(), user_id);
            insights
        }
        Err(e) => {
            error!("Insight generation failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn generate_insights_inner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Insight>, AppError> {
    let metrics = metrics_service::compute_metrics(pool, user_id).await?;
    let categories = spending_queries::fetch_for_user(pool, user_id).await?;
    let recommendations = recommendation_queries::fetch_active(pool, user_id).await?;
    let featured = deal_queries::fetch_featured(pool).await?;

    let batch = build_insights(&metrics, &categories, &recommendations, &featured);
    let stored = insight_queries::replace_insights(pool, user_id, batch).await?;
    Ok(stored)
}

/// Regenerate the user's next-best-action batch. Same degradation contract
/// as the insights.
pub async fn generate_actions(pool: &PgPool, user_id: Uuid) -> Vec<NextBestAction> {
    match generate_actions_inner(pool, user_id).await {
        Ok(actions) => {
            info!("Generated {} actions for user {}", actions.len(), user_id);
            actions
        }
        Err(e) => {
            error!("Action generation failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn generate_actions_inner(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<NextBestAction>, AppError> {
    let entries = ledger_queries::fetch_active(pool, user_id).await?;
    let cards = card_queries::fetch_active(pool, user_id).await?;
    let profile = profile_queries::fetch_for_user(pool, user_id).await?;
    let recommendations = recommendation_queries::fetch_active(pool, user_id).await?;
    let categories = spending_queries::fetch_for_user(pool, user_id).await?;

    let onboarding = OnboardingState {
        has_income_records: entries
            .iter()
            .any(|e| classifier::classify_name(&e.name) == EntryClass::Income),
        has_card_records: !cards.is_empty(),
        email_linked: profile.is_some_and(|p| p.email_linked),
    };

    let batch = build_actions(&onboarding, &recommendations, &categories);
    let stored = insight_queries::replace_actions(pool, user_id, batch).await?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sqlx::types::Json;

    fn metrics(income: f64, sr: f64, util: f64, dti: f64) -> FinancialMetrics {
        FinancialMetrics {
            monthly_income: income,
            savings_rate: sr,
            credit_utilization: util,
            debt_to_income_ratio: dti,
            ..Default::default()
        }
    }

    fn aggregate(category: &str, spend: f64, trend: &str, trend_pct: f64) -> SpendingCategoryAggregate {
        SpendingCategoryAggregate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            current_month_spend: spend,
            previous_month_spend: spend,
            trend: trend.to_string(),
            trend_pct,
            updated_at: Utc::now(),
        }
    }

    fn recommendation(category: Option<&str>, monthly_savings: f64) -> CardRecommendation {
        CardRecommendation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            target: "new_card".to_string(),
            reason: "high_spending_category".to_string(),
            bank_name: "HDFC".to_string(),
            card_name: "Dine Plus".to_string(),
            category: category.map(String::from),
            reasons: Json(Vec::new()),
            estimated_monthly_savings: monthly_savings,
            estimated_annual_savings: monthly_savings * 12.0,
            score: 50.0,
            priority: 7,
            viewed: false,
            viewed_at: None,
            dismissed: false,
            dismissed_at: None,
            applied: false,
            applied_at: None,
            expires_at: Utc::now() + Duration::days(30),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn featured_deal(category: &str) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            merchant: "Cafe Now".to_string(),
            category: category.to_string(),
            deal_type: "discount".to_string(),
            value: 15.0,
            max_discount: None,
            min_transaction: None,
            card_offers: Json(Vec::new()),
            valid_from: Utc::now(),
            valid_until: Utc::now() + Duration::days(7),
            is_featured: true,
            views: 0,
            clicks: 0,
            redemptions: 0,
            popularity_score: 0.0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_low_savings_warning() {
        let insights = build_insights(&metrics(50000.0, 0.05, 0.1, 0.1), &[], &[], &[]);
        let warn = insights
            .iter()
            .find(|i| i.category == InsightCategory::Savings)
            .unwrap();
        assert_eq!(warn.priority, InsightPriority::High);
    }

    #[test]
    fn test_excellent_savings_praise() {
        let insights = build_insights(&metrics(50000.0, 0.4, 0.1, 0.1), &[], &[], &[]);
        let praise = insights
            .iter()
            .find(|i| i.category == InsightCategory::Savings)
            .unwrap();
        assert_eq!(praise.priority, InsightPriority::Low);
    }

    #[test]
    fn test_mid_savings_generates_nothing() {
        let insights = build_insights(&metrics(50000.0, 0.2, 0.1, 0.1), &[], &[], &[]);
        assert!(!insights.iter().any(|i| i.category == InsightCategory::Savings));
    }

    #[test]
    fn test_utilization_rules() {
        let high = build_insights(&metrics(50000.0, 0.2, 0.9, 0.1), &[], &[], &[]);
        assert!(high
            .iter()
            .any(|i| i.category == InsightCategory::Credit && i.priority == InsightPriority::High));

        let healthy = build_insights(&metrics(50000.0, 0.2, 0.15, 0.1), &[], &[], &[]);
        assert!(healthy
            .iter()
            .any(|i| i.category == InsightCategory::Credit && i.priority == InsightPriority::Low));

        // Zero utilization is not praised; there is nothing to praise.
        let zero = build_insights(&metrics(50000.0, 0.2, 0.0, 0.1), &[], &[], &[]);
        assert!(!zero.iter().any(|i| i.category == InsightCategory::Credit));
    }

    #[test]
    fn test_debt_warning() {
        let insights = build_insights(&metrics(50000.0, 0.2, 0.1, 0.6), &[], &[], &[]);
        assert!(insights.iter().any(|i| i.category == InsightCategory::Debt));
    }

    #[test]
    fn test_category_optimization_floor() {
        let categories = vec![aggregate("dining", 10000.0, "stable", 0.0)];
        let recs = vec![recommendation(Some("dining"), 250.0)];
        let insights = build_insights(&metrics(50000.0, 0.2, 0.1, 0.1), &categories, &recs, &[]);
        assert!(insights
            .iter()
            .any(|i| i.category == InsightCategory::CategoryOptimization));

        let small = vec![recommendation(Some("dining"), 150.0)];
        let none = build_insights(&metrics(50000.0, 0.2, 0.1, 0.1), &categories, &small, &[]);
        assert!(!none
            .iter()
            .any(|i| i.category == InsightCategory::CategoryOptimization));
    }

    #[test]
    fn test_deal_insights_capped_at_two() {
        let categories = vec![
            aggregate("dining", 10000.0, "stable", 0.0),
            aggregate("groceries", 8000.0, "stable", 0.0),
            aggregate("travel", 6000.0, "stable", 0.0),
        ];
        let deals = vec![
            featured_deal("dining"),
            featured_deal("groceries"),
            featured_deal("travel"),
        ];
        let insights = build_insights(&metrics(50000.0, 0.2, 0.1, 0.1), &categories, &[], &deals);
        let deal_count = insights
            .iter()
            .filter(|i| i.category == InsightCategory::Deal)
            .count();
        assert_eq!(deal_count, 2);
    }

    #[test]
    fn test_rising_spend_needs_20_pct() {
        let categories = vec![
            aggregate("dining", 10000.0, "up", 25.0),
            aggregate("groceries", 8000.0, "up", 10.0),
        ];
        let insights = build_insights(&metrics(50000.0, 0.2, 0.1, 0.1), &categories, &[], &[]);
        let rising: Vec<_> = insights
            .iter()
            .filter(|i| i.category == InsightCategory::RisingSpend)
            .collect();
        assert_eq!(rising.len(), 1);
        assert!(rising[0].title.contains("dining"));
    }

    #[test]
    fn test_onboarding_actions_priorities() {
        let actions = build_actions(&OnboardingState::default(), &[], &[]);
        assert_eq!(actions[0].priority, 10);
        assert_eq!(actions[0].action_type, ActionType::AddSalary);
        assert_eq!(actions[1].priority, 9);
        assert_eq!(actions[2].priority, 5);
    }

    #[test]
    fn test_recommendation_action_needs_savings() {
        let onboarding = OnboardingState {
            has_income_records: true,
            has_card_records: true,
            email_linked: true,
        };
        let actions = build_actions(&onboarding, &[recommendation(None, 250.0)], &[]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::ApplyRecommendation);
        assert_eq!(actions[0].priority, 7);

        let none = build_actions(&onboarding, &[recommendation(None, 150.0)], &[]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_rising_category_reduction_action() {
        let onboarding = OnboardingState {
            has_income_records: true,
            has_card_records: true,
            email_linked: true,
        };
        let categories = vec![aggregate("shopping", 12000.0, "up", 30.0)];
        let actions = build_actions(&onboarding, &[], &categories);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::ReduceCategorySpend);
        assert_eq!(actions[0].priority, 5);
    }
}
