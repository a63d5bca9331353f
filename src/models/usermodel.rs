// models/usermodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
pub enum UserType {
    Vendor,
    Retailer,
    Driver,
    Admin,
}

impl UserType {
    pub fn to_str(&self) -> &str {
        match self {
            UserType::Vendor => "vendor",
            UserType::Retailer => "retailer",
            UserType::Driver => "driver",
            UserType::Admin => "admin",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub user_type: UserType,
    pub business_name: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display name shown in comparison listings. Vendors trade under their
    /// business name when they have one.
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}
