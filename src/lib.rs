pub mod config;
pub mod db;
pub mod dtos;
pub mod models;
pub mod service;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::db::DBClient;
use service::{
    comparison_service::ComparisonService,
    ratings_service::RatingsService,
    recommendation_service::RecommendationService,
};

/// Shared state wiring the comparison core together for whatever API layer
/// sits on top of it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub comparison_service: Arc<ComparisonService>,
    pub recommendation_service: Arc<RecommendationService>,
    pub ratings_service: Arc<RatingsService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let comparison_service = Arc::new(ComparisonService::new(db_client_arc.clone()));
        let recommendation_service = Arc::new(RecommendationService::new(db_client_arc.clone()));
        let ratings_service = Arc::new(RatingsService::new(db_client_arc.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            comparison_service,
            recommendation_service,
            ratings_service,
        }
    }
}
