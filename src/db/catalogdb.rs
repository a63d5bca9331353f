// db/catalogdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::catalogmodels::*;
use crate::models::usermodel::{User, UserType};

// Delivered order joined with the quantity of its first line item, used to
// reconstruct what a retailer actually paid per unit.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveredOrder {
    pub seller_id: Uuid,
    pub total_amount: BigDecimal,
    pub first_item_quantity: Option<f64>,
}

// Review joined with the reviewer's display name for vendor profiles.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithReviewer {
    pub reviewer_name: String,
    pub rating_quality: i32,
    pub rating_delay: i32,
    pub rating_communication: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CatalogExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn list_vendor_ids(&self) -> Result<Vec<Uuid>, Error>;

    /// Active, in-stock products whose name contains the given substring
    /// (case-insensitive). Price bounds are applied in the query; rating and
    /// delivery-time filters need joined aggregates and are applied later.
    async fn search_active_products(
        &self,
        product_name: &str,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Vec<Product>, Error>;

    /// Exact-name active listing for one vendor, used for recommendation
    /// candidacy checks.
    async fn get_active_product_for_vendor(
        &self,
        vendor_id: Uuid,
        product_name: &str,
    ) -> Result<Option<Product>, Error>;

    async fn get_recent_vendor_reviews(
        &self,
        vendor_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductReview>, Error>;

    async fn get_recent_vendor_reviews_with_reviewer(
        &self,
        vendor_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ReviewWithReviewer>, Error>;

    async fn get_vendor_reviews(&self, vendor_id: Uuid) -> Result<Vec<ProductReview>, Error>;

    async fn get_delivered_orders(&self, buyer_id: Uuid) -> Result<Vec<DeliveredOrder>, Error>;

    async fn count_seller_orders(&self, seller_id: Uuid) -> Result<i64, Error>;

    async fn count_seller_delivered_orders(&self, seller_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl CatalogExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_vendor_ids(&self) -> Result<Vec<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE user_type = $1 ORDER BY created_at")
            .bind(UserType::Vendor)
            .fetch_all(&self.pool)
            .await
    }

    async fn search_active_products(
        &self,
        product_name: &str,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Vec<Product>, Error> {
        let mut query_str = String::from(
            r#"
            SELECT p.* FROM products p
            WHERE p.product_name ILIKE $1
            AND p.is_active = TRUE
            AND p.stock_quantity > 0
            "#,
        );

        let mut bind_idx = 2;
        if min_price.is_some() {
            query_str.push_str(&format!(" AND p.price >= ${}", bind_idx));
            bind_idx += 1;
        }
        if max_price.is_some() {
            query_str.push_str(&format!(" AND p.price <= ${}", bind_idx));
        }
        query_str.push_str(" ORDER BY p.created_at");

        let pattern = format!("%{}%", product_name);
        let mut query = sqlx::query_as::<_, Product>(&query_str).bind(pattern);

        if let Some(min) = min_price {
            let min_bd = BigDecimal::try_from(min)
                .map_err(|_| Error::Decode("Invalid min_price".into()))?;
            query = query.bind(min_bd);
        }
        if let Some(max) = max_price {
            let max_bd = BigDecimal::try_from(max)
                .map_err(|_| Error::Decode("Invalid max_price".into()))?;
            query = query.bind(max_bd);
        }

        query.fetch_all(&self.pool).await
    }

    async fn get_active_product_for_vendor(
        &self,
        vendor_id: Uuid,
        product_name: &str,
    ) -> Result<Option<Product>, Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE vendor_id = $1 AND product_name = $2 AND is_active = TRUE
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(vendor_id)
        .bind(product_name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_recent_vendor_reviews(
        &self,
        vendor_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductReview>, Error> {
        sqlx::query_as::<_, ProductReview>(
            "SELECT * FROM product_reviews WHERE vendor_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(vendor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_recent_vendor_reviews_with_reviewer(
        &self,
        vendor_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ReviewWithReviewer>, Error> {
        // Inner join drops reviews whose reviewer account no longer exists.
        sqlx::query_as::<_, ReviewWithReviewer>(
            r#"
            SELECT
                u.name AS reviewer_name,
                r.rating_quality,
                r.rating_delay,
                r.rating_communication,
                r.comment,
                r.created_at
            FROM product_reviews r
            JOIN users u ON u.id = r.retailer_id
            WHERE r.vendor_id = $1
            ORDER BY r.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(vendor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_vendor_reviews(&self, vendor_id: Uuid) -> Result<Vec<ProductReview>, Error> {
        sqlx::query_as::<_, ProductReview>(
            "SELECT * FROM product_reviews WHERE vendor_id = $1 ORDER BY created_at",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_delivered_orders(&self, buyer_id: Uuid) -> Result<Vec<DeliveredOrder>, Error> {
        sqlx::query_as::<_, DeliveredOrder>(
            r#"
            SELECT o.seller_id, o.total_amount, fi.quantity AS first_item_quantity
            FROM orders o
            LEFT JOIN LATERAL (
                SELECT quantity FROM order_items
                WHERE order_id = o.id
                ORDER BY created_at
                LIMIT 1
            ) fi ON TRUE
            WHERE o.buyer_id = $1 AND o.order_status = $2
            ORDER BY o.created_at
            "#,
        )
        .bind(buyer_id)
        .bind(OrderStatus::Delivered)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_seller_orders(&self, seller_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn count_seller_delivered_orders(&self, seller_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE seller_id = $1 AND order_status = $2",
        )
        .bind(seller_id)
        .bind(OrderStatus::Delivered)
        .fetch_one(&self.pool)
        .await
    }
}
