// service/ratings_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        catalogdb::CatalogExt,
        comparisondb::{ComparisonExt, RatingsRecompute},
        db::DBClient,
    },
    models::catalogmodels::ProductReview,
    service::error::ServiceError,
    utils::rounding::round2,
};

/// Recomputes a vendor's rating aggregate in full from raw reviews. Invoked
/// by the review-submission flow after every new or edited review; there is
/// no incremental update path.
#[derive(Debug, Clone)]
pub struct RatingsService {
    db_client: Arc<DBClient>,
}

impl RatingsService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Full synchronous recomputation. A vendor with no reviews is left
    /// untouched; cache rows for such vendors only appear through the lazy
    /// comparison-path defaults.
    pub async fn update_vendor_ratings_cache(&self, vendor_id: Uuid) -> Result<(), ServiceError> {
        let reviews = self.db_client.get_vendor_reviews(vendor_id).await?;
        if reviews.is_empty() {
            tracing::debug!("vendor {} has no reviews, ratings cache untouched", vendor_id);
            return Ok(());
        }

        // Success rate comes from the orders table, not from reviews.
        let total_orders = self.db_client.count_seller_orders(vendor_id).await?;
        let delivered_orders = self
            .db_client
            .count_seller_delivered_orders(vendor_id)
            .await?;

        let recompute = build_recompute(&reviews, total_orders, delivered_orders);
        self.db_client
            .upsert_ratings_cache(vendor_id, &recompute)
            .await?;

        tracing::debug!(
            "recomputed ratings cache for vendor {} over {} reviews",
            vendor_id,
            reviews.len()
        );

        Ok(())
    }
}

// Component averages are simple means; the overall rating is the mean of the
// three component means. All rating fields round to 2 decimals.
fn build_recompute(
    reviews: &[ProductReview],
    total_orders: i64,
    delivered_orders: i64,
) -> RatingsRecompute {
    let total_reviews = reviews.len() as f64;
    let avg_quality =
        reviews.iter().map(|r| r.rating_quality as f64).sum::<f64>() / total_reviews;
    let avg_punctuality =
        reviews.iter().map(|r| r.rating_delay as f64).sum::<f64>() / total_reviews;
    let avg_communication = reviews
        .iter()
        .map(|r| r.rating_communication as f64)
        .sum::<f64>()
        / total_reviews;
    let overall = (avg_quality + avg_punctuality + avg_communication) / 3.0;

    let success_rate = if total_orders > 0 {
        delivered_orders as f64 / total_orders as f64 * 100.0
    } else {
        0.0
    };

    RatingsRecompute {
        avg_quality_rating: round2(avg_quality),
        avg_punctuality_rating: round2(avg_punctuality),
        avg_communication_rating: round2(avg_communication),
        overall_rating: round2(overall),
        total_reviews: reviews.len() as i32,
        success_rate: round2(success_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::PgPool;

    fn review(quality: i32, delay: i32, communication: i32) -> ProductReview {
        ProductReview {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            retailer_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            driver_id: None,
            rating_quality: quality,
            rating_delay: delay,
            rating_communication: communication,
            comment: None,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn overall_is_mean_of_component_means() {
        let reviews = vec![review(5, 4, 3), review(4, 4, 4), review(3, 5, 2)];
        let recompute = build_recompute(&reviews, 10, 9);

        assert_eq!(recompute.avg_quality_rating, 4.0);
        assert_eq!(recompute.avg_punctuality_rating, 4.33);
        assert_eq!(recompute.avg_communication_rating, 3.0);

        let expected_overall = round2((4.0 + 13.0 / 3.0 + 3.0) / 3.0);
        assert_eq!(recompute.overall_rating, expected_overall);
        assert_eq!(recompute.total_reviews, 3);
        assert_eq!(recompute.success_rate, 90.0);
    }

    #[test]
    fn success_rate_is_zero_without_orders() {
        let reviews = vec![review(5, 5, 5)];
        let recompute = build_recompute(&reviews, 0, 0);
        assert_eq!(recompute.success_rate, 0.0);
        assert_eq!(recompute.overall_rating, 5.0);
    }

    #[test]
    fn recompute_is_idempotent_for_unchanged_reviews() {
        let reviews = vec![review(4, 3, 5), review(2, 5, 4)];
        let first = build_recompute(&reviews, 7, 5);
        let second = build_recompute(&reviews, 7, 5);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ratings_service_compiles() {
        let pool = PgPool::connect_lazy("postgres://localhost/freshmandi").unwrap();
        let db_client = Arc::new(DBClient::new(pool));
        let svc = RatingsService::new(db_client);

        let _ = svc.update_vendor_ratings_cache(Uuid::nil());
    }
}
