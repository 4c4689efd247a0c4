// Route exports
pub mod auth;
pub mod posts;
pub mod services;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::MatchingSettings;
use crate::models::HealthResponse;
use crate::services::{CacheManager, Store};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cache: Arc<CacheManager>,
    pub auth: Arc<AuthService>,
    pub matching: MatchingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(posts::configure)
            .configure(services::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
