// bin/backfill_vendor_metrics.rs
//
// One-shot maintenance tool: makes sure every vendor has ratings-cache and
// delivery-metrics rows, then recomputes every ratings cache from raw
// reviews. Safe to re-run; all writes are idempotent upserts.

use std::sync::Arc;

use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::LevelFilter;

use freshmandi::config::Config;
use freshmandi::db::catalogdb::CatalogExt;
use freshmandi::db::comparisondb::ComparisonExt;
use freshmandi::db::db::DBClient;
use freshmandi::service::ratings_service::RatingsService;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = Arc::new(DBClient::new(pool));
    let ratings_service = RatingsService::new(db_client.clone());

    let vendor_ids = match db_client.list_vendor_ids().await {
        Ok(ids) => ids,
        Err(err) => {
            tracing::error!("Failed to list vendors: {:?}", err);
            std::process::exit(1);
        }
    };

    tracing::info!("backfilling comparison metrics for {} vendors", vendor_ids.len());

    let mut seeded = 0usize;
    let mut recomputed = 0usize;
    let mut failed = 0usize;

    for vendor_id in vendor_ids {
        let seed = async {
            db_client.get_or_create_ratings_cache(vendor_id).await?;
            db_client.get_or_create_delivery_metrics(vendor_id).await?;
            Ok::<_, sqlx::Error>(())
        };

        if let Err(err) = seed.await {
            tracing::warn!("vendor {}: failed to seed cache rows: {}", vendor_id, err);
            failed += 1;
            continue;
        }
        seeded += 1;

        match ratings_service.update_vendor_ratings_cache(vendor_id).await {
            Ok(()) => recomputed += 1,
            Err(err) => {
                tracing::warn!("vendor {}: ratings recompute failed: {}", vendor_id, err);
                failed += 1;
            }
        }
    }

    tracing::info!(
        "backfill complete: {} seeded, {} recomputed, {} failed",
        seeded,
        recomputed,
        failed
    );
}
