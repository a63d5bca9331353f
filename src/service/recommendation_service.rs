// service/recommendation_service.rs
use std::sync::Arc;

use num_traits::ToPrimitive;
use uuid::Uuid;

use crate::{
    db::{
        catalogdb::CatalogExt,
        comparisondb::ComparisonExt,
        db::DBClient,
    },
    dtos::recommendationdtos::*,
    service::error::ServiceError,
    utils::rounding::round2,
};

// Preference classification thresholds over a retailer's delivered history.
const QUALITY_RATING_THRESHOLD: f64 = 4.5;
const PRICE_FOCUS_THRESHOLD: f64 = 45.0;

// A retailer needs this many delivered orders before preference inference
// kicks in; below it the cold-start path recommends the top-rated vendor.
const MIN_ORDER_HISTORY: usize = 3;

const COLD_START_SCORE: f64 = 0.8;

#[derive(Debug, Clone)]
struct CandidateScore {
    vendor_id: Uuid,
    score: f64,
    quality: f64,
    price: f64,
}

/// Picks one vendor for a retailer by inferring a preference profile from
/// delivered-order history and scoring the candidate set against it.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    db_client: Arc<DBClient>,
}

impl RecommendationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn get_personalized_recommendation(
        &self,
        retailer_id: Uuid,
        product_name: &str,
        vendors_available: &[Uuid],
    ) -> Result<Recommendation, ServiceError> {
        let past_orders = self.db_client.get_delivered_orders(retailer_id).await?;

        if past_orders.len() < MIN_ORDER_HISTORY {
            tracing::debug!(
                "retailer {} has {} delivered orders, using cold start",
                retailer_id,
                past_orders.len()
            );
            return self.recommend_for_new_retailer(vendors_available).await;
        }

        // Orders whose seller has no ratings cache carry no usable signal and
        // are skipped from both numerator and denominator.
        let mut rating_sum = 0.0;
        let mut price_sum = 0.0;
        let mut count = 0usize;

        for order in &past_orders {
            if let Some(cache) = self.db_client.get_ratings_cache(order.seller_id).await? {
                let quantity = order.first_item_quantity.unwrap_or(1.0).max(1.0);
                rating_sum += cache.overall_rating;
                price_sum += order.total_amount.to_f64().unwrap_or(0.0) / quantity;
                count += 1;
            }
        }

        if count == 0 {
            return self.recommend_for_new_retailer(vendors_available).await;
        }

        let avg_rating_chosen = rating_sum / count as f64;
        let avg_price_paid = price_sum / count as f64;

        let (preference_type, weights) = classify_preference(avg_rating_chosen, avg_price_paid);

        // A candidate must carry an exact-name active listing plus both cache
        // rows; anything less is excluded rather than defaulted.
        let mut best: Option<CandidateScore> = None;
        for &vendor_id in vendors_available {
            let product = match self
                .db_client
                .get_active_product_for_vendor(vendor_id, product_name)
                .await?
            {
                Some(product) => product,
                None => continue,
            };
            let ratings = match self.db_client.get_ratings_cache(vendor_id).await? {
                Some(ratings) => ratings,
                None => continue,
            };
            let metrics = match self.db_client.get_delivery_metrics(vendor_id).await? {
                Some(metrics) => metrics,
                None => continue,
            };

            let price = product.price.to_f64().unwrap_or(0.0);
            let score = score_candidate(
                &weights,
                ratings.overall_rating,
                price,
                metrics.avg_delivery_time,
            );

            let is_better = match &best {
                Some(current) => score > current.score,
                None => true,
            };
            if is_better {
                best = Some(CandidateScore {
                    vendor_id,
                    score,
                    quality: ratings.overall_rating,
                    price,
                });
            }
        }

        let best = match best {
            Some(best) => best,
            None => return self.recommend_for_new_retailer(vendors_available).await,
        };

        let reason = match preference_type {
            PreferenceType::QualityFocused => format!(
                "You prefer high-quality vendors. This vendor has a {:.1}★ rating.",
                best.quality
            ),
            PreferenceType::PriceFocused => format!(
                "You prefer competitive pricing. This vendor offers ₹{:.0}/{}.",
                best.price, product_name
            ),
            _ => format!(
                "Best balanced option: {:.1}★ quality at ₹{:.0}.",
                best.quality, best.price
            ),
        };

        Ok(Recommendation {
            recommended_vendor_id: Some(best.vendor_id),
            reason: reason.clone(),
            recommendation_score: round2(best.score),
            analysis: RecommendationAnalysis {
                your_avg_price_paid: Some(round2(avg_price_paid)),
                your_quality_preference: Some(round2(avg_rating_chosen)),
                preference_type,
                why_selected: reason,
            },
        })
    }

    /// Cold-start path: highest-rated vendor among those that already have a
    /// ratings cache, first vendor in the list when none do. The score is a
    /// fixed placeholder, not computed.
    async fn recommend_for_new_retailer(
        &self,
        vendors_available: &[Uuid],
    ) -> Result<Recommendation, ServiceError> {
        let mut rated = Vec::with_capacity(vendors_available.len());
        for &vendor_id in vendors_available {
            if let Some(cache) = self.db_client.get_ratings_cache(vendor_id).await? {
                rated.push((vendor_id, cache.overall_rating));
            }
        }

        let best_vendor_id =
            pick_highest_rated(&rated).or_else(|| vendors_available.first().copied());

        Ok(Recommendation {
            recommended_vendor_id: best_vendor_id,
            reason: "Highest rated vendor (recommended for new customers)".to_string(),
            recommendation_score: COLD_START_SCORE,
            analysis: RecommendationAnalysis {
                your_avg_price_paid: None,
                your_quality_preference: None,
                preference_type: PreferenceType::NewCustomer,
                why_selected: "No order history yet. Recommending top-rated vendor.".to_string(),
            },
        })
    }
}

fn classify_preference(
    avg_rating_chosen: f64,
    avg_price_paid: f64,
) -> (PreferenceType, PreferenceWeights) {
    if avg_rating_chosen >= QUALITY_RATING_THRESHOLD {
        (
            PreferenceType::QualityFocused,
            PreferenceWeights {
                quality: 0.6,
                price: 0.2,
                delivery: 0.2,
            },
        )
    } else if avg_price_paid < PRICE_FOCUS_THRESHOLD {
        (
            PreferenceType::PriceFocused,
            PreferenceWeights {
                quality: 0.2,
                price: 0.6,
                delivery: 0.2,
            },
        )
    } else {
        (
            PreferenceType::Balanced,
            PreferenceWeights {
                quality: 0.4,
                price: 0.3,
                delivery: 0.3,
            },
        )
    }
}

// Components normalize to roughly [0,1]: quality over the 5-star scale, price
// against a 100-unit ceiling (floored at 0, deliberately not upper-clamped),
// delivery against an 8-hour window.
fn score_candidate(
    weights: &PreferenceWeights,
    overall_rating: f64,
    price: f64,
    delivery_time: f64,
) -> f64 {
    let quality_score = overall_rating / 5.0;
    let price_score = (1.0 - price / 100.0).max(0.0);
    let delivery_score = (1.0 - delivery_time / 480.0).max(0.0);

    quality_score * weights.quality + price_score * weights.price + delivery_score * weights.delivery
}

// Strict comparison keeps the first-encountered vendor on ties. Vendors whose
// cached rating is zero never win; the caller falls back to the head of the
// candidate list.
fn pick_highest_rated(rated: &[(Uuid, f64)]) -> Option<Uuid> {
    let mut best_vendor_id = None;
    let mut best_rating = 0.0;

    for &(vendor_id, rating) in rated {
        if rating > best_rating {
            best_rating = rating;
            best_vendor_id = Some(vendor_id);
        }
    }

    best_vendor_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use std::sync::Arc;

    #[test]
    fn classification_thresholds() {
        let (pref, weights) = classify_preference(4.6, 60.0);
        assert_eq!(pref, PreferenceType::QualityFocused);
        assert_eq!(
            weights,
            PreferenceWeights { quality: 0.6, price: 0.2, delivery: 0.2 }
        );

        // boundary inclusive on the rating side
        let (pref, _) = classify_preference(4.5, 60.0);
        assert_eq!(pref, PreferenceType::QualityFocused);

        let (pref, weights) = classify_preference(4.0, 40.0);
        assert_eq!(pref, PreferenceType::PriceFocused);
        assert_eq!(
            weights,
            PreferenceWeights { quality: 0.2, price: 0.6, delivery: 0.2 }
        );

        // boundary exclusive on the price side
        let (pref, weights) = classify_preference(4.0, 45.0);
        assert_eq!(pref, PreferenceType::Balanced);
        assert_eq!(
            weights,
            PreferenceWeights { quality: 0.4, price: 0.3, delivery: 0.3 }
        );
    }

    #[test]
    fn candidate_score_applies_weights_verbatim() {
        let weights = PreferenceWeights { quality: 0.6, price: 0.2, delivery: 0.2 };
        // 4.5/5 = 0.9, 1 - 40/100 = 0.6, 1 - 240/480 = 0.5
        let score = score_candidate(&weights, 4.5, 40.0, 240.0);
        assert!((score - 0.76).abs() < 1e-9);
    }

    #[test]
    fn candidate_price_score_floors_at_zero() {
        let weights = PreferenceWeights { quality: 0.0, price: 1.0, delivery: 0.0 };
        assert_eq!(score_candidate(&weights, 4.0, 250.0, 240.0), 0.0);
        assert_eq!(score_candidate(&weights, 4.0, 0.0, 240.0), 1.0);
    }

    #[test]
    fn highest_rated_wins_cold_start() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(pick_highest_rated(&[(a, 4.9), (b, 3.0)]), Some(a));
        assert_eq!(pick_highest_rated(&[(a, 3.0), (b, 4.9)]), Some(b));
    }

    #[test]
    fn cold_start_ties_keep_first_vendor() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(pick_highest_rated(&[(a, 4.5), (b, 4.5)]), Some(a));
    }

    #[test]
    fn cold_start_with_no_rated_vendors_is_none() {
        assert_eq!(pick_highest_rated(&[]), None);
        assert_eq!(pick_highest_rated(&[(Uuid::new_v4(), 0.0)]), None);
    }

    #[tokio::test]
    async fn recommendation_service_compiles() {
        let pool = PgPool::connect_lazy("postgres://localhost/freshmandi").unwrap();
        let db_client = Arc::new(DBClient::new(pool));
        let svc = RecommendationService::new(db_client);

        let _ = svc.get_personalized_recommendation(Uuid::nil(), "tomato", &[]);
    }
}
