// db/comparisondb.rs
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::comparisonmodels::*;

// Recomputed aggregate written back by the ratings maintenance path. The
// on_time_rate and repeat_customer_rate columns are owned by other flows and
// are left untouched on update.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingsRecompute {
    pub avg_quality_rating: f64,
    pub avg_punctuality_rating: f64,
    pub avg_communication_rating: f64,
    pub overall_rating: f64,
    pub total_reviews: i32,
    pub success_rate: f64,
}

#[async_trait]
pub trait ComparisonExt {
    async fn get_ratings_cache(&self, vendor_id: Uuid)
        -> Result<Option<VendorRatingsCache>, Error>;

    /// Get-or-create with seeded defaults so new vendors are comparable
    /// immediately. Concurrent creators race on the vendor_id uniqueness
    /// constraint; the loser re-reads the winner's row.
    async fn get_or_create_ratings_cache(
        &self,
        vendor_id: Uuid,
    ) -> Result<VendorRatingsCache, Error>;

    async fn get_delivery_metrics(
        &self,
        vendor_id: Uuid,
    ) -> Result<Option<VendorDeliveryMetrics>, Error>;

    async fn get_or_create_delivery_metrics(
        &self,
        vendor_id: Uuid,
    ) -> Result<VendorDeliveryMetrics, Error>;

    /// Single-row upsert of the recomputed rating aggregate.
    async fn upsert_ratings_cache(
        &self,
        vendor_id: Uuid,
        recompute: &RatingsRecompute,
    ) -> Result<VendorRatingsCache, Error>;

    /// Append one comparison event. No updates or deletes exist for this table.
    async fn insert_comparison_record(
        &self,
        comparison_id: Uuid,
        retailer_id: Uuid,
        product_name: &str,
        vendors_compared: JsonValue,
        selected_vendor_id: Option<Uuid>,
        sort_preference: Option<String>,
        filters_applied: Option<JsonValue>,
    ) -> Result<ComparisonRecord, Error>;
}

#[async_trait]
impl ComparisonExt for DBClient {
    async fn get_ratings_cache(
        &self,
        vendor_id: Uuid,
    ) -> Result<Option<VendorRatingsCache>, Error> {
        sqlx::query_as::<_, VendorRatingsCache>(
            "SELECT * FROM vendor_ratings_cache WHERE vendor_id = $1",
        )
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_or_create_ratings_cache(
        &self,
        vendor_id: Uuid,
    ) -> Result<VendorRatingsCache, Error> {
        if let Some(cache) = self.get_ratings_cache(vendor_id).await? {
            return Ok(cache);
        }

        sqlx::query(
            r#"
            INSERT INTO vendor_ratings_cache
            (vendor_id, avg_quality_rating, avg_punctuality_rating, avg_communication_rating,
             overall_rating, total_reviews, success_rate, on_time_rate, repeat_customer_rate)
            VALUES ($1, 4.0, 4.0, 4.0, 4.0, 0, 95.0, 90.0, 0.0)
            ON CONFLICT (vendor_id) DO NOTHING
            "#,
        )
        .bind(vendor_id)
        .execute(&self.pool)
        .await?;

        self.get_ratings_cache(vendor_id)
            .await?
            .ok_or(Error::RowNotFound)
    }

    async fn get_delivery_metrics(
        &self,
        vendor_id: Uuid,
    ) -> Result<Option<VendorDeliveryMetrics>, Error> {
        sqlx::query_as::<_, VendorDeliveryMetrics>(
            "SELECT * FROM vendor_delivery_metrics WHERE vendor_id = $1",
        )
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_or_create_delivery_metrics(
        &self,
        vendor_id: Uuid,
    ) -> Result<VendorDeliveryMetrics, Error> {
        if let Some(metrics) = self.get_delivery_metrics(vendor_id).await? {
            return Ok(metrics);
        }

        sqlx::query(
            r#"
            INSERT INTO vendor_delivery_metrics
            (vendor_id, avg_delivery_time, min_delivery_time, max_delivery_time,
             on_time_count, late_count, total_deliveries)
            VALUES ($1, 240, 120, 360, 0, 0, 0)
            ON CONFLICT (vendor_id) DO NOTHING
            "#,
        )
        .bind(vendor_id)
        .execute(&self.pool)
        .await?;

        self.get_delivery_metrics(vendor_id)
            .await?
            .ok_or(Error::RowNotFound)
    }

    async fn upsert_ratings_cache(
        &self,
        vendor_id: Uuid,
        recompute: &RatingsRecompute,
    ) -> Result<VendorRatingsCache, Error> {
        sqlx::query_as::<_, VendorRatingsCache>(
            r#"
            INSERT INTO vendor_ratings_cache
            (vendor_id, avg_quality_rating, avg_punctuality_rating, avg_communication_rating,
             overall_rating, total_reviews, success_rate, on_time_rate, repeat_customer_rate,
             last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 90.0, 0.0, NOW())
            ON CONFLICT (vendor_id)
            DO UPDATE SET
                avg_quality_rating = $2,
                avg_punctuality_rating = $3,
                avg_communication_rating = $4,
                overall_rating = $5,
                total_reviews = $6,
                success_rate = $7,
                last_updated = NOW()
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(recompute.avg_quality_rating)
        .bind(recompute.avg_punctuality_rating)
        .bind(recompute.avg_communication_rating)
        .bind(recompute.overall_rating)
        .bind(recompute.total_reviews)
        .bind(recompute.success_rate)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_comparison_record(
        &self,
        comparison_id: Uuid,
        retailer_id: Uuid,
        product_name: &str,
        vendors_compared: JsonValue,
        selected_vendor_id: Option<Uuid>,
        sort_preference: Option<String>,
        filters_applied: Option<JsonValue>,
    ) -> Result<ComparisonRecord, Error> {
        sqlx::query_as::<_, ComparisonRecord>(
            r#"
            INSERT INTO product_comparisons
            (comparison_id, retailer_id, product_name, vendors_compared,
             selected_vendor_id, sort_preference, filters_applied)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(comparison_id)
        .bind(retailer_id)
        .bind(product_name)
        .bind(vendors_compared)
        .bind(selected_vendor_id)
        .bind(sort_preference)
        .bind(filters_applied)
        .fetch_one(&self.pool)
        .await
    }
}
