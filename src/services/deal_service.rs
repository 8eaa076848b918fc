//! Deal matching: values a deal at a transaction amount, matches deals
//! against the user's wallet, and ranks personalized deals.

use sqlx::PgPool;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::{card_queries, deal_queries, spending_queries};
use crate::errors::AppError;
use crate::models::{CardAccount, Deal, DealMatch, DealType, SpendingCategoryAggregate};

/// Transaction amount used when a deal's savings are quoted without a
/// concrete purchase.
pub const REFERENCE_TXN: f64 = 1_000.0;

/// Each point is worth a quarter of a currency unit.
const POINT_VALUE: f64 = 0.25;

/// Bonus when a deal's category is among the user's top spend categories.
const CATEGORY_AFFINITY_BONUS: f64 = 50.0;
const FEATURED_BONUS: f64 = 30.0;

/// Monetary value of a deal at a given transaction amount.
pub fn deal_value(deal: &Deal, txn_amount: f64) -> f64 {
    match deal.deal_type() {
        Some(DealType::Cashback) | Some(DealType::Discount) => {
            let raw = txn_amount * deal.value / 100.0;
            match deal.max_discount {
                Some(cap) => raw.min(cap),
                None => raw,
            }
        }
        Some(DealType::Points) => deal.value * POINT_VALUE,
        Some(DealType::Bogo) | Some(DealType::Freebie) | Some(DealType::Voucher) => deal.value,
        None => {
            warn!("Deal {} has unrecognized type '{}'", deal.id, deal.deal_type);
            0.0
        }
    }
}

/// Match one deal against the user's wallet. Additional savings come from the
/// best applicable per-bank offer among the user's cards, compared against
/// the best offer available anywhere on the market; the total takes the
/// larger of the two.
pub fn match_deal(deal: &Deal, owned: &[CardAccount]) -> DealMatch {
    let base_savings = deal_value(deal, REFERENCE_TXN);

    let mut user_card_savings = 0.0;
    let mut user_bank: Option<String> = None;
    let mut market_card_savings = 0.0;
    let mut market_bank: Option<String> = None;

    for offer in deal.card_offers.iter() {
        let additional = offer.additional_discount * REFERENCE_TXN / 100.0;

        if additional > market_card_savings {
            market_card_savings = additional;
            market_bank = Some(offer.bank_name.clone());
        }

        let user_has_bank = owned
            .iter()
            .any(|c| c.bank_name.eq_ignore_ascii_case(&offer.bank_name));
        if user_has_bank && additional > user_card_savings {
            user_card_savings = additional;
            user_bank = Some(offer.bank_name.clone());
        }
    }

    // The named bank must be the one behind the quoted total. Ties go to
    // the card the user already holds.
    let best_card_bank = if user_card_savings >= market_card_savings {
        user_bank
    } else {
        market_bank
    };

    DealMatch {
        deal_id: deal.id,
        merchant: deal.merchant.clone(),
        base_savings,
        user_card_savings,
        market_card_savings,
        total_savings: base_savings + user_card_savings.max(market_card_savings),
        best_card_bank,
    }
}

/// Personalized ranking score for one deal.
pub fn personalized_score(deal: &Deal, top_categories: &[SpendingCategoryAggregate]) -> f64 {
    let category_bonus = if top_categories
        .iter()
        .any(|agg| agg.category.eq_ignore_ascii_case(&deal.category))
    {
        CATEGORY_AFFINITY_BONUS
    } else {
        0.0
    };
    let featured_bonus = if deal.is_featured { FEATURED_BONUS } else { 0.0 };

    deal.popularity_score + category_bonus + featured_bonus + deal.value
}

/// Rank candidate deals for a user and return the top N.
pub fn rank_deals(
    mut deals: Vec<Deal>,
    top_categories: &[SpendingCategoryAggregate],
    limit: usize,
) -> Vec<Deal> {
    deals.sort_by(|a, b| {
        personalized_score(b, top_categories).total_cmp(&personalized_score(a, top_categories))
    });
    deals.truncate(limit);
    deals
}

/// Match a deal against the user's cards.
pub async fn match_deal_for_user(
    pool: &PgPool,
    user_id: Uuid,
    deal_id: Uuid,
) -> Result<DealMatch, AppError> {
    let deal = deal_queries::fetch_one(pool, deal_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let owned = card_queries::fetch_active(pool, user_id).await?;
    Ok(match_deal(&deal, &owned))
}

/// Top-N personalized deals. Degrades to an empty list on failure: a broken
/// ranking must never block the surrounding screen.
pub async fn get_personalized_deals(pool: &PgPool, user_id: Uuid, limit: i64) -> Vec<Deal> {
    let result: Result<Vec<Deal>, AppError> = async {
        let deals = deal_queries::fetch_active(pool).await?;
        let top = spending_queries::fetch_top_categories(pool, user_id, 5).await?;
        Ok(rank_deals(deals, &top, limit.max(0) as usize))
    }
    .await;

    match result {
        Ok(deals) => deals,
        Err(e) => {
            error!("Personalized deal ranking failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

/// Record a redemption and opportunistically refresh the popularity score.
/// The counter write is the one that matters; a failed refresh only delays
/// the score.
pub async fn redeem(pool: &PgPool, deal_id: Uuid) -> Result<(), AppError> {
    let affected = deal_queries::increment_redemptions(pool, deal_id).await?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }
    if let Err(e) = deal_queries::refresh_popularity(pool, deal_id).await {
        warn!("Popularity refresh failed for deal {}: {}", deal_id, e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sqlx::types::Json;
    use crate::models::CardOffer;

    fn deal(deal_type: &str, value: f64, max_discount: Option<f64>) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            merchant: "Test Merchant".to_string(),
            category: "dining".to_string(),
            deal_type: deal_type.to_string(),
            value,
            max_discount,
            min_transaction: None,
            card_offers: Json(Vec::new()),
            valid_from: Utc::now(),
            valid_until: Utc::now() + Duration::days(30),
            is_featured: false,
            views: 0,
            clicks: 0,
            redemptions: 0,
            popularity_score: 0.0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn owned_card(bank: &str) -> CardAccount {
        CardAccount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            bank_name: bank.to_string(),
            card_name: "Any".to_string(),
            credit_limit: 100000.0,
            current_balance: 0.0,
            available_credit: 100000.0,
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
    fn test_cashback_capped_by_max_discount() {
        // 10% cashback capped at 50, txn 1000.
        let d = deal("cashback", 10.0, Some(50.0));
        assert_eq!(deal_value(&d, 1000.0), 50.0);
    }

    #[test]
    fn test_cashback_uncapped() {
        let d = deal("cashback", 10.0, None);
        assert_eq!(deal_value(&d, 1000.0), 100.0);
    }

    #[test]
    fn test_discount_below_cap() {
        let d = deal("discount", 5.0, Some(500.0));
        assert_eq!(deal_value(&d, 1000.0), 50.0);
    }

    #[test]
    fn test_points_quarter_value() {
        let d = deal("points", 400.0, None);
        assert_eq!(deal_value(&d, 1000.0), 100.0);
    }

    #[test]
    fn test_flat_value_types() {
        for t in ["bogo", "freebie", "voucher"] {
            let d = deal(t, 250.0, None);
            assert_eq!(deal_value(&d, 1000.0), 250.0);
        }
    }

    #[test]
    fn test_unknown_type_is_worthless() {
        let d = deal("mystery", 50.0, None);
        assert_eq!(deal_value(&d, 1000.0), 0.0);
    }

    #[test]
    fn test_match_prefers_user_card_when_it_wins() {
        let mut d = deal("cashback", 10.0, None);
        d.card_offers = Json(vec![
            CardOffer {
                bank_name: "HDFC".to_string(),
                card_name: None,
                additional_discount: 5.0,
            },
            CardOffer {
                bank_name: "AXIS".to_string(),
                card_name: None,
                additional_discount: 3.0,
            },
        ]);
        let m = match_deal(&d, &[owned_card("HDFC")]);
        assert_eq!(m.base_savings, 100.0);
        assert_eq!(m.user_card_savings, 50.0);
        assert_eq!(m.market_card_savings, 50.0);
        assert_eq!(m.total_savings, 150.0);
        assert_eq!(m.best_card_bank.as_deref(), Some("HDFC"));
    }

    #[test]
    fn test_match_uses_market_offer_when_user_has_none() {
        let mut d = deal("cashback", 10.0, None);
        d.card_offers = Json(vec![CardOffer {
            bank_name: "AXIS".to_string(),
            card_name: None,
            additional_discount: 8.0,
        }]);
        let m = match_deal(&d, &[owned_card("HDFC")]);
        assert_eq!(m.user_card_savings, 0.0);
        assert_eq!(m.market_card_savings, 80.0);
        assert_eq!(m.total_savings, 180.0);
        assert_eq!(m.best_card_bank.as_deref(), Some("AXIS"));
    }

    #[test]
    fn test_match_names_market_bank_when_it_beats_user_card() {
        // The user's HDFC offer applies but the AXIS offer pays more; the
        // quoted total comes from AXIS, so AXIS must be the named bank.
        let mut d = deal("cashback", 10.0, None);
        d.card_offers = Json(vec![
            CardOffer {
                bank_name: "HDFC".to_string(),
                card_name: None,
                additional_discount: 3.0,
            },
            CardOffer {
                bank_name: "AXIS".to_string(),
                card_name: None,
                additional_discount: 8.0,
            },
        ]);
        let m = match_deal(&d, &[owned_card("HDFC")]);
        assert_eq!(m.user_card_savings, 30.0);
        assert_eq!(m.market_card_savings, 80.0);
        assert_eq!(m.total_savings, 180.0);
        assert_eq!(m.best_card_bank.as_deref(), Some("AXIS"));
    }

    #[test]
    fn test_match_without_offers() {
        let d = deal("discount", 20.0, None);
        let m = match_deal(&d, &[owned_card("HDFC")]);
        assert_eq!(m.total_savings, 200.0);
        assert!(m.best_card_bank.is_none());
    }

    #[test]
    fn test_personalized_score_components() {
        let mut d = deal("discount", 15.0, None);
        d.popularity_score = 40.0;
        d.is_featured = true;
        let top = vec![aggregate("dining", 10000.0)];
        // 40 popularity + 50 category + 30 featured + 15 value
        assert_eq!(personalized_score(&d, &top), 135.0);
        assert_eq!(personalized_score(&d, &[]), 85.0);
    }

    #[test]
    fn test_rank_deals_sorts_and_truncates() {
        let mut hot = deal("discount", 10.0, None);
        hot.popularity_score = 500.0;
        let mut warm = deal("discount", 10.0, None);
        warm.popularity_score = 100.0;
        let cold = deal("discount", 10.0, None);

        let ranked = rank_deals(vec![cold.clone(), hot.clone(), warm.clone()], &[], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, hot.id);
        assert_eq!(ranked[1].id, warm.id);
    }

    #[test]
    fn test_popularity_formula() {
        assert_eq!(Deal::compute_popularity(10, 5, 3), 50.0);
    }
}
