// models/catalogmodels.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

// Product listing. Soft-deleted via is_active; stock is tracked by weight
// so quantities are fractional.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: f64,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub freshness_level: Option<String>,
    pub quality_tier: Option<String>,
    pub certification: Option<String>,
    pub moq_enabled: bool,
    pub moq_type: Option<String>,
    pub minimum_quantity: Option<f64>,
    pub minimum_weight: Option<f64>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Minimum order quantity a buyer must take, 0 when MOQ is disabled.
    pub fn effective_moq(&self) -> f64 {
        if self.moq_enabled {
            self.minimum_quantity.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Certifications are stored as a comma-separated tag string.
    pub fn certification_list(&self) -> Vec<String> {
        match &self.certification {
            Some(raw) => raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub total_amount: BigDecimal,
    pub order_status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: f64,
    pub price_at_purchase: BigDecimal,
    pub created_at: Option<DateTime<Utc>>,
}

// Review left by a retailer after delivery. Component ratings are 1-5 stars;
// the overall rating of a single review is the mean of the three.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ProductReview {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub retailer_id: Uuid,
    pub vendor_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub rating_quality: i32,
    pub rating_delay: i32,
    pub rating_communication: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl ProductReview {
    pub fn overall_rating(&self) -> f64 {
        (self.rating_quality + self.rating_delay + self.rating_communication) as f64 / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(certification: Option<&str>, moq_enabled: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            product_name: "Tomato".to_string(),
            category: "vegetables".to_string(),
            description: None,
            price: BigDecimal::try_from(40.0).unwrap(),
            stock_quantity: 25.0,
            unit: "kg".to_string(),
            expiry_date: None,
            freshness_level: Some("TODAY".to_string()),
            quality_tier: Some("GOOD".to_string()),
            certification: certification.map(String::from),
            moq_enabled,
            moq_type: None,
            minimum_quantity: Some(5.0),
            minimum_weight: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn certification_list_splits_and_trims() {
        let p = product(Some("Organic, FSSAI ,Local"), false);
        assert_eq!(p.certification_list(), vec!["Organic", "FSSAI", "Local"]);
        assert!(product(None, false).certification_list().is_empty());
    }

    #[test]
    fn effective_moq_is_zero_when_disabled() {
        assert_eq!(product(None, true).effective_moq(), 5.0);
        assert_eq!(product(None, false).effective_moq(), 0.0);
    }

    #[test]
    fn review_overall_is_mean_of_components() {
        let review = ProductReview {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            retailer_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            driver_id: None,
            rating_quality: 5,
            rating_delay: 4,
            rating_communication: 3,
            comment: None,
            created_at: Utc::now(),
            edited_at: None,
        };
        assert!((review.overall_rating() - 4.0).abs() < 1e-9);
    }
}
