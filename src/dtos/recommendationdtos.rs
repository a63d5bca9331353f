// dtos/recommendationdtos.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purchasing preference profile inferred from a retailer's delivered orders.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceType {
    #[serde(rename = "quality-focused")]
    QualityFocused,
    #[serde(rename = "price-focused")]
    PriceFocused,
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "new_customer")]
    NewCustomer,
}

impl PreferenceType {
    pub fn to_str(&self) -> &str {
        match self {
            PreferenceType::QualityFocused => "quality-focused",
            PreferenceType::PriceFocused => "price-focused",
            PreferenceType::Balanced => "balanced",
            PreferenceType::NewCustomer => "new_customer",
        }
    }
}

/// Component weights applied to candidate scoring. Always sums to 1.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PreferenceWeights {
    pub quality: f64,
    pub price: f64,
    pub delivery: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecommendationAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_avg_price_paid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_quality_preference: Option<f64>,
    pub preference_type: PreferenceType,
    pub why_selected: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recommendation {
    pub recommended_vendor_id: Option<Uuid>,
    pub reason: String,
    pub recommendation_score: f64,
    pub analysis: RecommendationAnalysis,
}
