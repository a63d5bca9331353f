// models/comparisonmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Vendor tier classification based on rating and delivery speed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum VendorTier {
    #[serde(rename = "PREMIUM")]
    Premium,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "BUDGET")]
    Budget,
}

impl VendorTier {
    pub fn to_str(&self) -> &str {
        match self {
            VendorTier::Premium => "PREMIUM",
            VendorTier::Good => "GOOD",
            VendorTier::Budget => "BUDGET",
        }
    }
}

// Per-vendor rating aggregate, recomputed in full from product_reviews.
// Invariant: overall_rating is the mean of the three component averages.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct VendorRatingsCache {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub avg_quality_rating: f64,
    pub avg_punctuality_rating: f64,
    pub avg_communication_rating: f64,
    pub overall_rating: f64,
    pub total_reviews: i32,
    pub success_rate: f64,
    pub on_time_rate: f64,
    pub repeat_customer_rate: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

// Per-vendor delivery aggregate. Times are minutes.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct VendorDeliveryMetrics {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub avg_delivery_time: f64,
    pub min_delivery_time: f64,
    pub max_delivery_time: f64,
    pub on_time_count: i32,
    pub late_count: i32,
    pub total_deliveries: i32,
}

// Append-only log row recording one search/compare/select event.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ComparisonRecord {
    pub id: Uuid,
    pub comparison_id: Uuid,
    pub retailer_id: Uuid,
    pub product_name: String,
    pub vendors_compared: JsonValue,
    pub selected_vendor_id: Option<Uuid>,
    pub sort_preference: Option<String>,
    pub filters_applied: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&VendorTier::Premium).unwrap(), "\"PREMIUM\"");
        assert_eq!(VendorTier::Budget.to_str(), "BUDGET");
    }
}
