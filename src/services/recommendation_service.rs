//! Card recommendation engine: greedy per-user scoring of catalog cards
//! against spending categories and the cards the user already holds.

use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::{card_queries, catalog_queries, recommendation_queries, spending_queries};
use crate::errors::AppError;
use crate::models::{
    CardAccount, CardRecommendation, CatalogCard, NewRecommendation, RecommendationReason,
    RecommendationTarget, SpendingCategoryAggregate,
};

/// Categories below this monthly spend are not worth a dedicated card.
const HIGH_SPEND_THRESHOLD: f64 = 5_000.0;
/// A catalog card must beat an owned card's reward by this much per month.
const BETTER_REWARDS_MARGIN: f64 = 100.0;
/// Utilization below this marks an owned card as under-used.
const LOW_UTILIZATION_THRESHOLD: f64 = 0.10;
/// Under-used cards are only worth nudging about above this limit.
const LOW_UTILIZATION_MIN_LIMIT: f64 = 50_000.0;
/// Fixed score for utilization nudges, which have no savings figure.
const LOW_UTILIZATION_SCORE: f64 = 60.0;

/// Net annual benefit of putting a category's spend on a card:
/// projected annual reward minus the annual fee.
pub fn net_benefit(card: &CatalogCard, category: &str, monthly_spend: f64) -> f64 {
    monthly_spend * 12.0 * card.rate_for_category(category) / 100.0 - card.annual_fee
}

/// Best catalog card for a category, or None when even the best choice costs
/// more than it returns. Never recommends a card with net benefit <= 0.
pub fn find_best_card_for_category<'a>(
    catalog: &'a [CatalogCard],
    category: &str,
    monthly_spend: f64,
) -> Option<(&'a CatalogCard, f64)> {
    catalog
        .iter()
        .filter(|c| c.offers_category(category))
        .map(|c| (c, net_benefit(c, category, monthly_spend)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, benefit)| *benefit > 0.0)
}

/// Resolve an owned card to its catalog entry by bank and card name.
fn resolve_owned<'a>(catalog: &'a [CatalogCard], owned: &CardAccount) -> Option<&'a CatalogCard> {
    catalog.iter().find(|c| {
        c.bank_name.eq_ignore_ascii_case(&owned.bank_name)
            && c.card_name.eq_ignore_ascii_case(&owned.card_name)
    })
}

/// The user's best current monthly reward for a category across their owned
/// cards. Cards that cannot be resolved to the catalog earn nothing.
fn best_owned_monthly_reward(
    catalog: &[CatalogCard],
    owned: &[CardAccount],
    category: &str,
    monthly_spend: f64,
) -> f64 {
    owned
        .iter()
        .filter_map(|card| resolve_owned(catalog, card))
        .map(|c| monthly_spend * c.rate_for_category(category) / 100.0)
        .fold(0.0, f64::max)
}

/// Build the full recommendation batch from already-fetched rows. Pure; the
/// emission order is high-spend categories, then better-rewards, then
/// utilization nudges, so the output is stable for unchanged inputs.
pub fn build_recommendations(
    categories: &[SpendingCategoryAggregate],
    catalog: &[CatalogCard],
    owned: &[CardAccount],
) -> Vec<NewRecommendation> {
    let mut batch = Vec::new();

    // (a) top-3 spending categories worth a dedicated card
    for agg in categories.iter().take(3) {
        if agg.current_month_spend < HIGH_SPEND_THRESHOLD {
            continue;
        }
        if let Some((card, annual_benefit)) =
            find_best_card_for_category(catalog, &agg.category, agg.current_month_spend)
        {
            let monthly_savings = annual_benefit / 12.0;
            batch.push(NewRecommendation {
                target: RecommendationTarget::NewCard,
                reason: RecommendationReason::HighSpendingCategory,
                bank_name: card.bank_name.clone(),
                card_name: card.card_name.clone(),
                category: Some(agg.category.clone()),
                reasons: vec![
                    format!(
                        "You spend {:.0} per month on {}",
                        agg.current_month_spend, agg.category
                    ),
                    format!(
                        "{} earns {}% on {}",
                        card.card_name,
                        card.rate_for_category(&agg.category),
                        agg.category
                    ),
                ],
                estimated_monthly_savings: monthly_savings,
                estimated_annual_savings: annual_benefit,
                score: NewRecommendation::score_from_savings(monthly_savings),
                priority: NewRecommendation::priority_from_savings(monthly_savings),
            });
        }
    }

    // (b) catalog cards that clearly beat what the user's wallet earns today
    for agg in categories {
        let current = best_owned_monthly_reward(catalog, owned, &agg.category, agg.current_month_spend);
        let candidate = catalog
            .iter()
            .filter(|c| c.offers_category(&agg.category))
            .filter(|c| resolve_owned_reverse(owned, c).is_none())
            .map(|c| (c, agg.current_month_spend * c.rate_for_category(&agg.category) / 100.0))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((card, reward)) = candidate {
            let gain = reward - current;
            if gain >= BETTER_REWARDS_MARGIN {
                batch.push(NewRecommendation {
                    target: RecommendationTarget::NewCard,
                    reason: RecommendationReason::BetterRewards,
                    bank_name: card.bank_name.clone(),
                    card_name: card.card_name.clone(),
                    category: Some(agg.category.clone()),
                    reasons: vec![format!(
                        "{} would earn {:.0} more per month on {} than your current cards",
                        card.card_name, gain, agg.category
                    )],
                    estimated_monthly_savings: gain,
                    estimated_annual_savings: gain * 12.0,
                    score: NewRecommendation::score_from_savings(gain),
                    priority: NewRecommendation::priority_from_savings(gain),
                });
            }
        }
    }

    // (c) owned cards sitting idle: encourage usage rather than a new product
    for card in owned {
        if card.utilization() < LOW_UTILIZATION_THRESHOLD
            && card.credit_limit > LOW_UTILIZATION_MIN_LIMIT
        {
            batch.push(NewRecommendation {
                target: RecommendationTarget::ExistingCard,
                reason: RecommendationReason::LowUtilization,
                bank_name: card.bank_name.clone(),
                card_name: card.card_name.clone(),
                category: None,
                reasons: vec![format!(
                    "Your {} is using {:.0}% of its {:.0} limit",
                    card.card_name,
                    card.utilization() * 100.0,
                    card.credit_limit
                )],
                estimated_monthly_savings: 0.0,
                estimated_annual_savings: 0.0,
                score: LOW_UTILIZATION_SCORE,
                priority: NewRecommendation::priority_from_savings(0.0),
            });
        }
    }

    batch
}

fn resolve_owned_reverse<'a>(owned: &'a [CardAccount], catalog_card: &CatalogCard) -> Option<&'a CardAccount> {
    owned.iter().find(|o| {
        o.bank_name.eq_ignore_ascii_case(&catalog_card.bank_name)
            && o.card_name.eq_ignore_ascii_case(&catalog_card.card_name)
    })
}

/// Upgrade discovery: same-bank, higher-tier catalog cards that pay for
/// themselves. A candidate is recommended only when the projected reward
/// across all of the user's spending categories exceeds its annual fee.
pub fn build_upgrade_options(
    categories: &[SpendingCategoryAggregate],
    catalog: &[CatalogCard],
    owned: &[CardAccount],
) -> Vec<NewRecommendation> {
    let mut batch = Vec::new();

    for card in owned {
        let Some(current) = resolve_owned(catalog, card) else {
            continue;
        };
        let Some(current_tier) = current.tier() else {
            continue;
        };

        for candidate in catalog.iter().filter(|c| {
            c.bank_name.eq_ignore_ascii_case(&card.bank_name)
                && c.tier().is_some_and(|t| t.rank() > current_tier.rank())
        }) {
            let annual_reward: f64 = categories
                .iter()
                .map(|agg| {
                    agg.current_month_spend * 12.0 * candidate.rate_for_category(&agg.category)
                        / 100.0
                })
                .sum();

            let annual_benefit = annual_reward - candidate.annual_fee;
            if annual_benefit <= 0.0 {
                continue;
            }

            let monthly_savings = annual_benefit / 12.0;
            batch.push(NewRecommendation {
                target: RecommendationTarget::Upgrade,
                reason: RecommendationReason::UpgradeAvailable,
                bank_name: candidate.bank_name.clone(),
                card_name: candidate.card_name.clone(),
                category: None,
                reasons: vec![format!(
                    "Upgrading your {} to {} would return {:.0} per year after the {:.0} fee",
                    card.card_name, candidate.card_name, annual_benefit, candidate.annual_fee
                )],
                estimated_monthly_savings: monthly_savings,
                estimated_annual_savings: annual_benefit,
                score: NewRecommendation::score_from_savings(monthly_savings),
                priority: NewRecommendation::priority_from_savings(monthly_savings),
            });
        }
    }

    batch
}

/// Regenerate the user's recommendation set: replace-not-merge, so prior-run
/// rows never survive. Degrades to an empty list on internal failure rather
/// than failing the surrounding request.
pub async fn generate_recommendations(pool: &PgPool, user_id: Uuid) -> Vec<CardRecommendation> {
    match generate_inner(pool, user_id).await {
        Ok(recs) => {
            info!("Generated {} recommendations for user {}", recs.len(), user_id);
            recs
        }
        Err(e) => {
            error!("Recommendation generation failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn generate_inner(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CardRecommendation>, AppError> {
    let categories = spending_queries::fetch_top_categories(pool, user_id, 5).await?;
    let catalog = catalog_queries::fetch_active(pool).await?;
    let owned = card_queries::fetch_active(pool, user_id).await?;

    let batch = build_recommendations(&categories, &catalog, &owned);
    let stored = recommendation_queries::replace_batch(pool, user_id, batch).await?;
    Ok(stored)
}

/// Compute upgrade options on demand. Returned, not persisted: the batch in
/// the recommendations table stays owned by `generate_recommendations`.
pub async fn find_upgrade_options(pool: &PgPool, user_id: Uuid) -> Vec<NewRecommendation> {
    let result: Result<Vec<NewRecommendation>, AppError> = async {
        let categories = spending_queries::fetch_for_user(pool, user_id).await?;
        let catalog = catalog_queries::fetch_active(pool).await?;
        let owned = card_queries::fetch_active(pool, user_id).await?;
        Ok(build_upgrade_options(&categories, &catalog, &owned))
    }
    .await;

    match result {
        Ok(batch) => batch,
        Err(e) => {
            error!("Upgrade discovery failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use crate::models::CategoryReward;

    fn catalog_card(
        bank: &str,
        name: &str,
        tier: &str,
        fee: f64,
        rewards: Vec<(&str, f64)>,
    ) -> CatalogCard {
        CatalogCard {
            id: Uuid::new_v4(),
            bank_name: bank.to_string(),
            card_name: name.to_string(),
            tier: tier.to_string(),
            network: "visa".to_string(),
            annual_fee: fee,
            base_reward_rate: 1.0,
            category_rewards: Json(
                rewards
                    .into_iter()
                    .map(|(c, r)| CategoryReward {
                        category: c.to_string(),
                        reward_rate: r,
                        monthly_cap: None,
                    })
                    .collect(),
            ),
            is_active: true,
        }
    }

    fn owned_card(bank: &str, name: &str, limit: f64, balance: f64) -> CardAccount {
        CardAccount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            bank_name: bank.to_string(),
            card_name: name.to_string(),
            credit_limit: limit,
            current_balance: balance,
            available_credit: limit - balance,
            is_primary: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn aggregate(category: &str, spend: f64) -> SpendingCategoryAggregate {
        SpendingCategoryAggregate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            current_month_spend: spend,
            previous_month_spend: spend,
            trend: "stable".to_string(),
            trend_pct: 0.0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_net_benefit_formula() {
        let card = catalog_card("HDFC", "Dine Plus", "mid", 500.0, vec![("dining", 5.0)]);
        // 10000 * 12 * 5% = 6000, minus 500 fee
        assert!((net_benefit(&card, "dining", 10000.0) - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_card_never_negative_benefit() {
        let card = catalog_card("HDFC", "Pricey", "premium", 50000.0, vec![("dining", 2.0)]);
        // 1000 * 12 * 2% = 240 << 50000 fee
        assert!(find_best_card_for_category(&[card], "dining", 1000.0).is_none());
    }

    #[test]
    fn test_best_card_picks_max_benefit() {
        let cards = vec![
            catalog_card("HDFC", "Dine Plus", "mid", 500.0, vec![("dining", 5.0)]),
            catalog_card("ICICI", "Gourmet", "mid", 0.0, vec![("dining", 3.0)]),
        ];
        let (best, benefit) = find_best_card_for_category(&cards, "dining", 10000.0).unwrap();
        assert_eq!(best.card_name, "Dine Plus");
        assert!((benefit - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_spend_category_pass() {
        let catalog = vec![catalog_card("HDFC", "Dine Plus", "mid", 500.0, vec![("dining", 5.0)])];
        let categories = vec![aggregate("dining", 10000.0)];
        let batch = build_recommendations(&categories, &catalog, &[]);

        let rec = batch
            .iter()
            .find(|r| r.reason == RecommendationReason::HighSpendingCategory)
            .unwrap();
        assert_eq!(rec.bank_name, "HDFC");
        assert_eq!(rec.category.as_deref(), Some("dining"));
        assert!(rec.estimated_annual_savings > 0.0);
    }

    #[test]
    fn test_low_spend_category_skipped() {
        let catalog = vec![catalog_card("HDFC", "Dine Plus", "mid", 0.0, vec![("dining", 5.0)])];
        let categories = vec![aggregate("dining", 2000.0)];
        let batch = build_recommendations(&categories, &catalog, &[]);
        assert!(!batch
            .iter()
            .any(|r| r.reason == RecommendationReason::HighSpendingCategory));
    }

    #[test]
    fn test_better_rewards_requires_margin() {
        // Owned card earns 10000*2% = 200/month; candidate earns 300/month.
        // Gain of 100 meets the margin.
        let catalog = vec![
            catalog_card("HDFC", "Basic", "entry", 0.0, vec![("groceries", 2.0)]),
            catalog_card("AXIS", "Super Grocer", "mid", 0.0, vec![("groceries", 3.0)]),
        ];
        let owned = vec![owned_card("HDFC", "Basic", 100000.0, 50000.0)];
        let categories = vec![aggregate("groceries", 10000.0)];

        let batch = build_recommendations(&categories, &catalog, &owned);
        let rec = batch
            .iter()
            .find(|r| r.reason == RecommendationReason::BetterRewards)
            .unwrap();
        assert_eq!(rec.card_name, "Super Grocer");
        assert!((rec.estimated_monthly_savings - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_utilization_nudge() {
        let owned = vec![owned_card("HDFC", "Idle Card", 100000.0, 2000.0)];
        let batch = build_recommendations(&[], &[], &owned);
        let rec = batch
            .iter()
            .find(|r| r.reason == RecommendationReason::LowUtilization)
            .unwrap();
        assert_eq!(rec.target, RecommendationTarget::ExistingCard);
        assert_eq!(rec.score, 60.0);
        assert_eq!(rec.priority, 5);
    }

    #[test]
    fn test_low_utilization_requires_high_limit() {
        let owned = vec![owned_card("HDFC", "Small Card", 30000.0, 1000.0)];
        let batch = build_recommendations(&[], &[], &owned);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_priority_tiers() {
        assert_eq!(NewRecommendation::priority_from_savings(600.0), 9);
        assert_eq!(NewRecommendation::priority_from_savings(300.0), 7);
        assert_eq!(NewRecommendation::priority_from_savings(100.0), 5);
    }

    #[test]
    fn test_score_capped_at_100() {
        assert_eq!(NewRecommendation::score_from_savings(5000.0), 100.0);
        assert!((NewRecommendation::score_from_savings(250.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_regeneration_is_idempotent_at_scoring_level() {
        let catalog = vec![catalog_card("HDFC", "Dine Plus", "mid", 500.0, vec![("dining", 5.0)])];
        let categories = vec![aggregate("dining", 10000.0)];
        let owned = vec![owned_card("HDFC", "Idle Card", 100000.0, 2000.0)];

        let a = build_recommendations(&categories, &catalog, &owned);
        let b = build_recommendations(&categories, &catalog, &owned);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.card_name, y.card_name);
            assert_eq!(x.reason, y.reason);
            assert_eq!(x.score, y.score);
        }
    }

    #[test]
    fn test_upgrade_requires_fee_coverage() {
        let catalog = vec![
            catalog_card("HDFC", "Basic", "entry", 0.0, vec![("dining", 1.0)]),
            catalog_card("HDFC", "Infinia", "super_premium", 12500.0, vec![("dining", 5.0)]),
        ];
        let owned = vec![owned_card("HDFC", "Basic", 100000.0, 10000.0)];

        // 5000/month dining: 5000*12*5% = 3000 < 12500 fee, no upgrade.
        let none = build_upgrade_options(&[aggregate("dining", 5000.0)], &catalog, &owned);
        assert!(none.is_empty());

        // 30000/month dining: 30000*12*5% = 18000 > 12500 fee.
        let some = build_upgrade_options(&[aggregate("dining", 30000.0)], &catalog, &owned);
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].target, RecommendationTarget::Upgrade);
        assert_eq!(some[0].card_name, "Infinia");
    }

    #[test]
    fn test_upgrade_only_same_bank_higher_tier() {
        let catalog = vec![
            catalog_card("HDFC", "Basic", "mid", 0.0, vec![("dining", 1.0)]),
            catalog_card("AXIS", "Magnus", "super_premium", 0.0, vec![("dining", 5.0)]),
            catalog_card("HDFC", "Starter", "entry", 0.0, vec![("dining", 0.5)]),
        ];
        let owned = vec![owned_card("HDFC", "Basic", 100000.0, 10000.0)];
        let batch = build_upgrade_options(&[aggregate("dining", 50000.0)], &catalog, &owned);
        // AXIS is another bank; Starter is a lower tier.
        assert!(batch.is_empty());
    }
}
