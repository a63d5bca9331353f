// dtos/comparisondtos.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::comparisonmodels::VendorTier;

/// Sort orders accepted by the product search. Unrecognized strings parse to
/// None and leave the result order unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Price,
    Rating,
    DeliveryTime,
    Value,
}

impl SortBy {
    pub fn parse(raw: &str) -> Option<SortBy> {
        match raw {
            "price" => Some(SortBy::Price),
            "rating" => Some(SortBy::Rating),
            "delivery_time" => Some(SortBy::DeliveryTime),
            "value" => Some(SortBy::Value),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            SortBy::Price => "price",
            SortBy::Rating => "rating",
            SortBy::DeliveryTime => "delivery_time",
            SortBy::Value => "value",
        }
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Value
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default)]
pub struct SearchFilters {
    #[validate(range(min = 0.0, message = "min_price cannot be negative"))]
    pub min_price: Option<f64>,

    #[validate(range(min = 0.0, message = "max_price cannot be negative"))]
    pub max_price: Option<f64>,

    #[validate(range(min = 1.0, max = 5.0, message = "min_rating must be between 1 and 5"))]
    pub min_rating: Option<f64>,

    #[validate(range(min = 0.0, message = "max_delivery_time cannot be negative"))]
    pub max_delivery_time: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RatingBreakdown {
    pub overall: f64,
    pub quality: f64,
    pub punctuality: f64,
    pub communication: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorMetrics {
    pub success_rate: f64,
    pub on_time_rate: f64,
    pub repeat_customer_rate: f64,
    pub avg_delivery_time: f64,
    pub total_reviews: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProductDetails {
    pub freshness: Option<String>,
    pub expiry_days: i64,
    pub quality_tier: Option<String>,
    pub moq: f64,
    pub certifications: Vec<String>,
    pub stock_quantity: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewSummary {
    pub rating: f64,
    pub comment: String,
    pub date: String,
}

/// One vendor's row in a comparison result, fully joined and scored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorComparisonEntry {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub product_id: Uuid,
    pub price: f64,
    pub unit: String,
    pub moq: f64,
    pub rating: RatingBreakdown,
    pub metrics: VendorMetrics,
    pub product_details: ProductDetails,
    pub recent_reviews: Vec<ReviewSummary>,
    pub tier: VendorTier,
    pub value_score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComparisonResult {
    pub product_name: String,
    pub vendor_count: usize,
    pub vendors: Vec<VendorComparisonEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComparisonMatrixRow {
    pub vendor_id: Uuid,
    pub name: String,
    pub price: f64,
    pub quality_rating: f64,
    pub delivery_hours: f64,
    pub success_rate: f64,
    pub reviews_count: i32,
    pub freshness: Option<String>,
    pub tier: VendorTier,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComparisonAnalysis {
    pub cheapest_vendor: Uuid,
    pub best_quality_vendor: Uuid,
    pub fastest_delivery_vendor: Uuid,
    pub best_value_vendor: Uuid,
    pub most_reliable_vendor: Uuid,
    pub price_range: ValueRange,
    pub rating_range: ValueRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisResult {
    pub product_name: String,
    pub vendors_comparison_matrix: Vec<ComparisonMatrixRow>,
    pub analysis: Option<ComparisonAnalysis>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorPerformance {
    pub total_orders: i64,
    pub success_rate: f64,
    pub repeat_customers: f64,
    pub avg_rating: f64,
    pub on_time_delivery: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliverySummary {
    pub avg_time_minutes: f64,
    pub avg_time_hours: f64,
    pub min_time_minutes: f64,
    pub max_time_minutes: f64,
    pub on_time_count: i32,
    pub late_count: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileReview {
    pub reviewer: String,
    pub rating: f64,
    pub quality: i32,
    pub punctuality: i32,
    pub communication: i32,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorProfileDto {
    pub vendor_id: Uuid,
    pub name: String,
    pub joined_date: String,
    pub location: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub ratings: RatingBreakdown,
    pub performance: VendorPerformance,
    pub delivery_metrics: DeliverySummary,
    pub recent_reviews: Vec<ProfileReview>,
    pub total_reviews: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_parse_accepts_known_keys() {
        assert_eq!(SortBy::parse("price"), Some(SortBy::Price));
        assert_eq!(SortBy::parse("delivery_time"), Some(SortBy::DeliveryTime));
        assert_eq!(SortBy::parse("popularity"), None);
        assert_eq!(SortBy::default(), SortBy::Value);
    }

    #[test]
    fn search_filters_validate_ranges() {
        let ok = SearchFilters {
            min_price: Some(30.0),
            max_price: Some(50.0),
            min_rating: Some(4.0),
            max_delivery_time: Some(360.0),
        };
        assert!(ok.validate().is_ok());

        let bad = SearchFilters {
            min_price: Some(-1.0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
