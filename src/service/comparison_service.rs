// service/comparison_service.rs
use std::sync::Arc;

use chrono::Utc;
use num_traits::ToPrimitive;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    db::{
        catalogdb::CatalogExt,
        comparisondb::ComparisonExt,
        db::DBClient,
    },
    dtos::comparisondtos::*,
    models::{
        catalogmodels::Product,
        comparisonmodels::VendorTier,
        usermodel::UserType,
    },
    service::error::ServiceError,
    utils::rounding::{round1, round2},
};

/// Compares every vendor selling a product: joins cached ratings and delivery
/// metrics onto each listing, scores and tiers the vendor, and ranks the set.
///
/// Score composition (fixed weights):
/// value_score = (quality*20 * 0.5 + clamp(100-price) * 0.3 + clamp(100-minutes/3.6) * 0.2) / 10
#[derive(Debug, Clone)]
pub struct ComparisonService {
    db_client: Arc<DBClient>,
}

impl ComparisonService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Search products by name substring and return one comparison entry per
    /// vendor selling a match. Rating and delivery-time filters apply after
    /// entry construction since they need the joined aggregates.
    pub async fn search_products_with_vendors(
        &self,
        product_name: &str,
        filters: &SearchFilters,
        sort_by: Option<SortBy>,
    ) -> Result<ComparisonResult, ServiceError> {
        let products = self
            .db_client
            .search_active_products(product_name, filters.min_price, filters.max_price)
            .await?;

        let mut vendors = Vec::with_capacity(products.len());
        for product in &products {
            let entry = self.build_vendor_entry(product).await?;
            if passes_filters(&entry, filters) {
                vendors.push(entry);
            }
        }

        sort_vendors(&mut vendors, sort_by);

        tracing::debug!(
            "comparison search '{}': {} vendors after filters",
            product_name,
            vendors.len()
        );

        Ok(ComparisonResult {
            product_name: product_name.to_string(),
            vendor_count: vendors.len(),
            vendors,
        })
    }

    /// Flattened comparison matrix plus a best-in-category scan over the full
    /// vendor set. An empty vendor set yields an empty matrix, not an error.
    pub async fn get_comparison_analysis(
        &self,
        product_name: &str,
    ) -> Result<AnalysisResult, ServiceError> {
        let result = self
            .search_products_with_vendors(product_name, &SearchFilters::default(), Some(SortBy::Value))
            .await?;

        let matrix = result.vendors.iter().map(matrix_row).collect();
        let analysis = build_analysis(&result.vendors);

        Ok(AnalysisResult {
            product_name: product_name.to_string(),
            vendors_comparison_matrix: matrix,
            analysis,
        })
    }

    /// Full vendor profile with ratings, performance and delivery summaries.
    /// Returns None for missing ids and for users that are not vendors.
    pub async fn get_vendor_profile(
        &self,
        vendor_id: Uuid,
    ) -> Result<Option<VendorProfileDto>, ServiceError> {
        let vendor = match self.db_client.get_user(vendor_id).await? {
            Some(user) if user.user_type == UserType::Vendor => user,
            _ => return Ok(None),
        };

        let ratings = self.db_client.get_or_create_ratings_cache(vendor_id).await?;
        let metrics = self.db_client.get_or_create_delivery_metrics(vendor_id).await?;
        let total_orders = self.db_client.count_seller_orders(vendor_id).await?;

        let recent = self
            .db_client
            .get_recent_vendor_reviews_with_reviewer(vendor_id, 10)
            .await?;

        let reviews = recent
            .into_iter()
            .map(|r| {
                let overall =
                    (r.rating_quality + r.rating_delay + r.rating_communication) as f64 / 3.0;
                ProfileReview {
                    reviewer: format!("{} (Retailer)", r.reviewer_name),
                    rating: round1(overall),
                    quality: r.rating_quality,
                    punctuality: r.rating_delay,
                    communication: r.rating_communication,
                    comment: r
                        .comment
                        .filter(|c| !c.is_empty())
                        .unwrap_or_else(|| "Great service".to_string()),
                    date: r.created_at.format("%Y-%m-%d").to_string(),
                }
            })
            .collect();

        Ok(Some(VendorProfileDto {
            vendor_id: vendor.id,
            name: vendor.display_name().to_string(),
            joined_date: vendor
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            location: vendor
                .address
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "Location not specified".to_string()),
            phone: vendor.phone.clone(),
            city: vendor.city.clone(),
            ratings: RatingBreakdown {
                overall: round2(ratings.overall_rating),
                quality: round2(ratings.avg_quality_rating),
                punctuality: round2(ratings.avg_punctuality_rating),
                communication: round2(ratings.avg_communication_rating),
            },
            performance: VendorPerformance {
                total_orders,
                success_rate: round2(ratings.success_rate),
                repeat_customers: round2(ratings.repeat_customer_rate),
                avg_rating: round2(ratings.overall_rating),
                on_time_delivery: round2(ratings.on_time_rate),
            },
            delivery_metrics: DeliverySummary {
                avg_time_minutes: metrics.avg_delivery_time,
                avg_time_hours: round1(metrics.avg_delivery_time / 60.0),
                min_time_minutes: metrics.min_delivery_time,
                max_time_minutes: metrics.max_delivery_time,
                on_time_count: metrics.on_time_count,
                late_count: metrics.late_count,
            },
            recent_reviews: reviews,
            total_reviews: ratings.total_reviews,
        }))
    }

    /// Append one comparison event for analytics and return its id.
    pub async fn log_comparison(
        &self,
        retailer_id: Uuid,
        product_name: &str,
        vendors_compared: &[Uuid],
        selected_vendor_id: Option<Uuid>,
        sort_preference: Option<String>,
        filters_applied: Option<JsonValue>,
    ) -> Result<Uuid, ServiceError> {
        let comparison_id = Uuid::new_v4();
        let vendors_json = serde_json::to_value(vendors_compared)?;

        self.db_client
            .insert_comparison_record(
                comparison_id,
                retailer_id,
                product_name,
                vendors_json,
                selected_vendor_id,
                sort_preference,
                filters_applied,
            )
            .await?;

        tracing::debug!(
            "logged comparison {} for retailer {} ({} vendors)",
            comparison_id,
            retailer_id,
            vendors_compared.len()
        );

        Ok(comparison_id)
    }

    /// Join one product with its vendor's cached ratings, delivery metrics and
    /// latest reviews. Missing cache rows are created with seeded defaults so
    /// new vendors are comparable immediately rather than excluded.
    async fn build_vendor_entry(
        &self,
        product: &Product,
    ) -> Result<VendorComparisonEntry, ServiceError> {
        let vendor = self
            .db_client
            .get_user(product.vendor_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let ratings = self
            .db_client
            .get_or_create_ratings_cache(vendor.id)
            .await?;
        let metrics = self
            .db_client
            .get_or_create_delivery_metrics(vendor.id)
            .await?;

        let recent = self.db_client.get_recent_vendor_reviews(vendor.id, 3).await?;
        let recent_reviews = recent
            .iter()
            .map(|r| ReviewSummary {
                rating: r.overall_rating(),
                comment: r
                    .comment
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "Great service".to_string()),
                date: r.created_at.format("%Y-%m-%d").to_string(),
            })
            .collect();

        let price = product.price.to_f64().unwrap_or(0.0);
        let value_score =
            Self::calculate_value_score(price, ratings.overall_rating, metrics.avg_delivery_time);
        let tier =
            Self::determine_vendor_tier(price, ratings.overall_rating, metrics.avg_delivery_time);

        let expiry_days = match product.expiry_date {
            Some(expiry) => (expiry - Utc::now().date_naive()).num_days().max(0),
            None => 0,
        };

        let moq = product.effective_moq();

        Ok(VendorComparisonEntry {
            vendor_id: vendor.id,
            vendor_name: vendor.display_name().to_string(),
            product_id: product.id,
            price,
            unit: product.unit.clone(),
            moq,
            rating: RatingBreakdown {
                overall: round2(ratings.overall_rating),
                quality: round2(ratings.avg_quality_rating),
                punctuality: round2(ratings.avg_punctuality_rating),
                communication: round2(ratings.avg_communication_rating),
            },
            metrics: VendorMetrics {
                success_rate: round2(ratings.success_rate),
                on_time_rate: round2(ratings.on_time_rate),
                repeat_customer_rate: round2(ratings.repeat_customer_rate),
                avg_delivery_time: metrics.avg_delivery_time,
                total_reviews: ratings.total_reviews,
            },
            product_details: ProductDetails {
                freshness: product.freshness_level.clone(),
                expiry_days,
                quality_tier: product.quality_tier.clone(),
                moq,
                certifications: product.certification_list(),
                stock_quantity: product.stock_quantity,
            },
            recent_reviews,
            tier,
            value_score,
        })
    }

    /// Composite 0-10 value score blending quality, price and delivery speed.
    ///
    /// Quality dominates (50%), then price (30%), then speed (20%). The price
    /// component is a linear inverse over typical unit prices in the tens;
    /// it is not normalized against the compared set's actual price range.
    pub fn calculate_value_score(price: f64, quality: f64, delivery_time: f64) -> f64 {
        let quality_score = quality * 20.0;
        let price_score = (100.0 - price).clamp(0.0, 100.0);
        // 360 minutes maps to 0 points, 0 minutes to 100
        let delivery_score = (100.0 - delivery_time / 3.6).clamp(0.0, 100.0);

        let value_score = quality_score * 0.5 + price_score * 0.3 + delivery_score * 0.2;
        round1(value_score / 10.0)
    }

    /// Tier thresholds: PREMIUM at 4.7+/<=4h, GOOD at 4.3+/<=6h, else BUDGET.
    /// Price is accepted for interface symmetry but plays no part in the
    /// classification.
    pub fn determine_vendor_tier(_price: f64, rating: f64, delivery_time: f64) -> VendorTier {
        if rating >= 4.7 && delivery_time <= 240.0 {
            VendorTier::Premium
        } else if rating >= 4.3 && delivery_time <= 360.0 {
            VendorTier::Good
        } else {
            VendorTier::Budget
        }
    }
}

fn passes_filters(entry: &VendorComparisonEntry, filters: &SearchFilters) -> bool {
    if let Some(min_rating) = filters.min_rating {
        if entry.rating.overall < min_rating {
            return false;
        }
    }
    if let Some(max_delivery_time) = filters.max_delivery_time {
        if entry.metrics.avg_delivery_time > max_delivery_time {
            return false;
        }
    }
    true
}

// Sorts are stable, so equal keys keep their query order. A None sort leaves
// the set untouched.
fn sort_vendors(vendors: &mut [VendorComparisonEntry], sort_by: Option<SortBy>) {
    use std::cmp::Ordering;

    match sort_by {
        Some(SortBy::Price) => vendors.sort_by(|a, b| {
            a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal)
        }),
        Some(SortBy::Rating) => vendors.sort_by(|a, b| {
            b.rating
                .overall
                .partial_cmp(&a.rating.overall)
                .unwrap_or(Ordering::Equal)
        }),
        Some(SortBy::DeliveryTime) => vendors.sort_by(|a, b| {
            a.metrics
                .avg_delivery_time
                .partial_cmp(&b.metrics.avg_delivery_time)
                .unwrap_or(Ordering::Equal)
        }),
        Some(SortBy::Value) => vendors.sort_by(|a, b| {
            b.value_score
                .partial_cmp(&a.value_score)
                .unwrap_or(Ordering::Equal)
        }),
        None => {}
    }
}

fn matrix_row(entry: &VendorComparisonEntry) -> ComparisonMatrixRow {
    ComparisonMatrixRow {
        vendor_id: entry.vendor_id,
        name: entry.vendor_name.clone(),
        price: entry.price,
        quality_rating: entry.rating.overall,
        delivery_hours: round1(entry.metrics.avg_delivery_time / 60.0),
        success_rate: entry.metrics.success_rate,
        reviews_count: entry.metrics.total_reviews,
        freshness: entry.product_details.freshness.clone(),
        tier: entry.tier,
    }
}

// Best-in-category scan. Strict comparisons keep the first-encountered vendor
// on ties.
fn build_analysis(vendors: &[VendorComparisonEntry]) -> Option<ComparisonAnalysis> {
    let first = vendors.first()?;

    let mut cheapest = first;
    let mut best_quality = first;
    let mut fastest = first;
    let mut best_value = first;
    let mut most_reliable = first;
    let mut max_price = first.price;
    let mut min_rating = first.rating.overall;

    for vendor in &vendors[1..] {
        if vendor.price < cheapest.price {
            cheapest = vendor;
        }
        if vendor.rating.overall > best_quality.rating.overall {
            best_quality = vendor;
        }
        if vendor.metrics.avg_delivery_time < fastest.metrics.avg_delivery_time {
            fastest = vendor;
        }
        if vendor.value_score > best_value.value_score {
            best_value = vendor;
        }
        if vendor.metrics.success_rate > most_reliable.metrics.success_rate {
            most_reliable = vendor;
        }
        if vendor.price > max_price {
            max_price = vendor.price;
        }
        if vendor.rating.overall < min_rating {
            min_rating = vendor.rating.overall;
        }
    }

    Some(ComparisonAnalysis {
        cheapest_vendor: cheapest.vendor_id,
        best_quality_vendor: best_quality.vendor_id,
        fastest_delivery_vendor: fastest.vendor_id,
        best_value_vendor: best_value.vendor_id,
        most_reliable_vendor: most_reliable.vendor_id,
        price_range: ValueRange {
            min: cheapest.price,
            max: max_price,
        },
        rating_range: ValueRange {
            min: min_rating,
            max: best_quality.rating.overall,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sqlx::PgPool;

    fn entry(price: f64, rating: f64, delivery_time: f64, success_rate: f64) -> VendorComparisonEntry {
        let value_score = ComparisonService::calculate_value_score(price, rating, delivery_time);
        VendorComparisonEntry {
            vendor_id: Uuid::new_v4(),
            vendor_name: "Test Vendor".to_string(),
            product_id: Uuid::new_v4(),
            price,
            unit: "kg".to_string(),
            moq: 0.0,
            rating: RatingBreakdown {
                overall: rating,
                quality: rating,
                punctuality: rating,
                communication: rating,
            },
            metrics: VendorMetrics {
                success_rate,
                on_time_rate: 90.0,
                repeat_customer_rate: 0.0,
                avg_delivery_time: delivery_time,
                total_reviews: 10,
            },
            product_details: ProductDetails {
                freshness: Some("TODAY".to_string()),
                expiry_days: 2,
                quality_tier: Some("GOOD".to_string()),
                moq: 0.0,
                certifications: vec![],
                stock_quantity: 20.0,
            },
            recent_reviews: vec![],
            tier: ComparisonService::determine_vendor_tier(price, rating, delivery_time),
            value_score,
        }
    }

    #[test]
    fn value_score_known_scenario() {
        // price 40 -> 60, rating 4.8 -> 96, 200min -> 44.4; weighted 74.88
        let score = ComparisonService::calculate_value_score(40.0, 4.8, 200.0);
        assert_eq!(score, 7.5);
    }

    #[test]
    fn value_score_clamps_extremes() {
        // free instant five-star vendor hits the ceiling
        assert_eq!(ComparisonService::calculate_value_score(0.0, 5.0, 0.0), 10.0);
        // expensive slow one-star vendor keeps only the quality floor
        assert_eq!(ComparisonService::calculate_value_score(500.0, 1.0, 720.0), 1.0);
    }

    proptest! {
        #[test]
        fn value_score_stays_in_bounds(
            price in 0.0f64..1000.0,
            rating in 1.0f64..=5.0,
            delivery_time in 0.0f64..10_000.0,
        ) {
            let score = ComparisonService::calculate_value_score(price, rating, delivery_time);
            prop_assert!((0.0..=10.0).contains(&score));
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.7, 240.0),
            VendorTier::Premium
        );
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.6, 240.0),
            VendorTier::Good
        );
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.7, 241.0),
            VendorTier::Good
        );
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.3, 360.0),
            VendorTier::Good
        );
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.2, 100.0),
            VendorTier::Budget
        );
        assert_eq!(
            ComparisonService::determine_vendor_tier(40.0, 4.5, 400.0),
            VendorTier::Budget
        );
    }

    #[test]
    fn tier_ignores_price() {
        let cheap = ComparisonService::determine_vendor_tier(1.0, 4.8, 100.0);
        let pricey = ComparisonService::determine_vendor_tier(5000.0, 4.8, 100.0);
        assert_eq!(cheap, pricey);
    }

    #[test]
    fn sort_by_price_ascending() {
        let mut vendors = vec![
            entry(50.0, 4.0, 200.0, 95.0),
            entry(20.0, 4.0, 200.0, 95.0),
            entry(35.0, 4.0, 200.0, 95.0),
        ];
        sort_vendors(&mut vendors, Some(SortBy::Price));
        let prices: Vec<f64> = vendors.iter().map(|v| v.price).collect();
        assert_eq!(prices, vec![20.0, 35.0, 50.0]);
    }

    #[test]
    fn sort_by_rating_descending() {
        let mut vendors = vec![
            entry(40.0, 4.1, 200.0, 95.0),
            entry(40.0, 4.9, 200.0, 95.0),
            entry(40.0, 4.5, 200.0, 95.0),
        ];
        sort_vendors(&mut vendors, Some(SortBy::Rating));
        let ratings: Vec<f64> = vendors.iter().map(|v| v.rating.overall).collect();
        assert_eq!(ratings, vec![4.9, 4.5, 4.1]);
    }

    #[test]
    fn sort_none_preserves_order() {
        let mut vendors = vec![
            entry(50.0, 4.0, 200.0, 95.0),
            entry(20.0, 4.8, 100.0, 99.0),
        ];
        let before: Vec<Uuid> = vendors.iter().map(|v| v.vendor_id).collect();
        sort_vendors(&mut vendors, None);
        let after: Vec<Uuid> = vendors.iter().map(|v| v.vendor_id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn filters_apply_to_joined_aggregates() {
        let filters = SearchFilters {
            min_rating: Some(4.5),
            max_delivery_time: Some(300.0),
            ..Default::default()
        };
        assert!(passes_filters(&entry(40.0, 4.8, 200.0, 95.0), &filters));
        assert!(!passes_filters(&entry(40.0, 4.4, 200.0, 95.0), &filters));
        assert!(!passes_filters(&entry(40.0, 4.8, 350.0, 95.0), &filters));
    }

    #[test]
    fn analysis_picks_best_in_each_category() {
        let vendors = vec![
            entry(50.0, 4.9, 300.0, 92.0),
            entry(20.0, 4.2, 150.0, 99.0),
            entry(35.0, 4.6, 100.0, 95.0),
        ];
        let analysis = build_analysis(&vendors).unwrap();
        assert_eq!(analysis.cheapest_vendor, vendors[1].vendor_id);
        assert_eq!(analysis.best_quality_vendor, vendors[0].vendor_id);
        assert_eq!(analysis.fastest_delivery_vendor, vendors[2].vendor_id);
        assert_eq!(analysis.most_reliable_vendor, vendors[1].vendor_id);
        assert_eq!(analysis.price_range.min, 20.0);
        assert_eq!(analysis.price_range.max, 50.0);
        assert_eq!(analysis.rating_range.min, 4.2);
        assert_eq!(analysis.rating_range.max, 4.9);
    }

    #[test]
    fn analysis_breaks_ties_on_first_encountered() {
        let vendors = vec![
            entry(30.0, 4.5, 200.0, 95.0),
            entry(30.0, 4.5, 200.0, 95.0),
        ];
        let analysis = build_analysis(&vendors).unwrap();
        assert_eq!(analysis.cheapest_vendor, vendors[0].vendor_id);
        assert_eq!(analysis.best_quality_vendor, vendors[0].vendor_id);
        assert_eq!(analysis.best_value_vendor, vendors[0].vendor_id);
    }

    #[test]
    fn analysis_of_empty_set_is_none() {
        assert!(build_analysis(&[]).is_none());
    }

    #[test]
    fn matrix_row_converts_minutes_to_hours() {
        let row = matrix_row(&entry(40.0, 4.8, 200.0, 95.0));
        assert_eq!(row.delivery_hours, 3.3);
        assert_eq!(row.tier, VendorTier::Premium);
    }

    #[tokio::test]
    async fn comparison_service_compiles() {
        let pool = PgPool::connect_lazy("postgres://localhost/freshmandi").unwrap();
        let db_client = Arc::new(DBClient::new(pool));
        let svc = ComparisonService::new(db_client);

        let _ = svc.get_comparison_analysis("tomato");
    }
}
