use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::{bounding_box, match_offers};
use crate::models::{
    CreateOfferRequest, CreateServiceRequestRequest, CreatedResponse, ErrorResponse, Located,
    MatchOffersResponse,
};
use crate::routes::AppState;
use crate::services::CacheKey;

/// Configure service request/offer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("/requests", web::post().to(create_request))
            .route("/offers", web::post().to(create_offer))
            .route("/matches/{request_id}", web::get().to(get_matches)),
    );
}

/// Create a service request
///
/// POST /api/v1/services/requests
async fn create_request(
    state: web::Data<AppState>,
    auth: AuthUser,
    req: web::Json<CreateServiceRequestRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    match state
        .store
        .insert_service_request(
            &req.title,
            &req.description,
            &req.category,
            req.budget,
            req.location.as_deref(),
            req.latitude,
            req.longitude,
            req.radius_km,
            auth.user_id,
        )
        .await
    {
        Ok(request) => {
            tracing::info!(
                "User {} created service request {} in category {}",
                auth.user_id,
                request.id,
                request.category
            );
            HttpResponse::Created().json(CreatedResponse {
                message: "ServiceRequest created".to_string(),
                id: request.id,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create service request: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Create a service offer
///
/// POST /api/v1/services/offers
async fn create_offer(
    state: web::Data<AppState>,
    auth: AuthUser,
    req: web::Json<CreateOfferRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    match state
        .store
        .insert_service_offer(
            &req.title,
            &req.description,
            &req.category,
            req.hourly_rate,
            req.location.as_deref(),
            req.latitude,
            req.longitude,
            req.radius_km,
            auth.user_id,
        )
        .await
    {
        Ok(offer) => {
            tracing::info!(
                "User {} created service offer {} in category {}",
                auth.user_id,
                offer.id,
                offer.category
            );

            // A new offer may change any cached match result
            if let Err(e) = state
                .cache
                .invalidate_pattern(CacheKey::all_request_matches())
                .await
            {
                tracing::warn!("Failed to invalidate match cache: {}", e);
            }

            HttpResponse::Created().json(CreatedResponse {
                message: "ServiceOffer created".to_string(),
                id: offer.id,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create service offer: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Offers matching a service request: same category, within the request's
/// radius, nearest first
///
/// GET /api/v1/services/matches/{request_id}
async fn get_matches(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let request_id = path.into_inner();

    let request = match state.store.get_service_request(request_id).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found("ServiceRequest not found"));
        }
        Err(e) => {
            tracing::error!("Failed to fetch service request {}: {}", request_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    let cache_key = CacheKey::request_matches(request_id);
    if let Ok(cached) = state.cache.get::<MatchOffersResponse>(&cache_key).await {
        tracing::debug!("Serving cached matches for request {}", request_id);
        return HttpResponse::Ok().json(cached);
    }

    // Candidates are counted across the whole category, before the bounding
    // box narrows the pool, so the number does not shrink with the radius
    let total_candidates = match state.store.count_offers_in_category(&request.category).await {
        Ok(count) => count as usize,
        Err(e) => {
            tracing::error!("Failed to count offers for request {}: {}", request_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    // A request without coordinates matches nothing
    let center = match request.location() {
        Some(point) => point,
        None => {
            return HttpResponse::Ok().json(MatchOffersResponse {
                matches: Vec::new(),
                total_candidates,
            });
        }
    };

    let bbox = bounding_box(center.lat, center.lon, request.radius_km);

    let offer_pool = match state.store.list_offers_in_bbox(&request.category, &bbox).await {
        Ok(offers) => offers,
        Err(e) => {
            tracing::error!("Failed to query offers for request {}: {}", request_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    let result = match_offers(&request, offer_pool);

    let response = MatchOffersResponse {
        matches: result.offers,
        total_candidates,
    };

    if let Err(e) = state.cache.set(&cache_key, &response).await {
        tracing::warn!("Failed to cache matches for request {}: {}", request_id, e);
    }

    tracing::info!(
        "Matched {} offers (of {} candidates) for request {}",
        response.matches.len(),
        response.total_candidates,
        request_id
    );

    HttpResponse::Ok().json(response)
}
