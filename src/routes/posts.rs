use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::{
    bounding_box, filter_within_radius, paginate_after, Page, PageParams,
};
use crate::models::{
    CreatePostRequest, CreatedResponse, ErrorResponse, GeoPoint, ListPostsQuery, MessageResponse,
    NearbyPost, NearbyQuery, UpdatePostRequest,
};
use crate::routes::AppState;

/// Configure post routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::post().to(create_post))
            .route("", web::get().to(list_posts))
            .route("/nearby", web::get().to(nearby_posts))
            .route("/{post_id}", web::get().to(get_post))
            .route("/{post_id}", web::put().to(update_post))
            .route("/{post_id}", web::delete().to(delete_post)),
    );
}

fn round_km(distance_km: f64) -> f64 {
    (distance_km * 1000.0).round() / 1000.0
}

/// Create a post
///
/// POST /api/v1/posts
async fn create_post(
    state: web::Data<AppState>,
    auth: AuthUser,
    req: web::Json<CreatePostRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    match state
        .store
        .insert_post(
            &req.title,
            &req.content,
            req.category.as_deref(),
            req.location.as_deref(),
            req.latitude,
            req.longitude,
            auth.user_id,
        )
        .await
    {
        Ok(post) => {
            tracing::info!("User {} created post {}", auth.user_id, post.id);
            HttpResponse::Created().json(CreatedResponse {
                message: "Post created successfully".to_string(),
                id: post.id,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create post: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// List posts
///
/// GET /api/v1/posts
///
/// Modes, selected by the query parameters present:
/// - spatial (`lat` + `lon`, optional `radius_km`): distance-ordered page of
///   posts within the radius, each annotated with `distance_km`
/// - cursor (`after_id`): posts with id > after_id, ascending, plus the next
///   cursor
/// - offset (default): newest first, `page`/`limit`, pagination pushed down
///   to the store
async fn list_posts(state: web::Data<AppState>, query: web::Query<ListPostsQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    let category = query.category.as_deref();

    // Spatial mode overrides the default ordering
    if let (Some(lat), Some(lon)) = (query.lat, query.lon) {
        let radius_km = query.radius_km.unwrap_or(state.matching.nearby_radius_km);
        let bbox = bounding_box(lat, lon, radius_km);

        let candidates = match state.store.list_located_posts(category, &bbox).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!("Failed to query located posts: {}", e);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal("store_error", e.to_string()));
            }
        };

        let within: Vec<NearbyPost> =
            filter_within_radius(GeoPoint::new(lat, lon), radius_km, candidates)
                .into_iter()
                .map(|(post, distance_km)| NearbyPost {
                    post,
                    distance_km: round_km(distance_km),
                })
                .collect();

        let params = PageParams::new(query.page, query.limit);
        let page = crate::core::paginate(within, params);
        return HttpResponse::Ok().json(page);
    }

    // Cursor mode
    if let Some(after_id) = query.after_id {
        let limit = crate::core::clamp_limit(query.limit);

        // Fetch one extra row to decide whether a next page exists
        let rows = match state
            .store
            .list_posts_after(category, after_id, limit as i64 + 1)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Failed to query posts after {}: {}", after_id, e);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal("store_error", e.to_string()));
            }
        };

        let page = paginate_after(rows, after_id, limit);
        return HttpResponse::Ok().json(page);
    }

    // Offset mode, pushed down to the store
    let params = PageParams::new(query.page, query.limit);

    let total = match state.store.count_posts(category).await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("Failed to count posts: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    match state
        .store
        .list_posts_page(category, params.limit as i64, params.offset() as i64)
        .await
    {
        Ok(items) => HttpResponse::Ok().json(Page {
            items,
            page: params.page,
            limit: params.limit,
            total: total as usize,
        }),
        Err(e) => {
            tracing::error!("Failed to list posts: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Posts near a point, nearest first
///
/// GET /api/v1/posts/nearby?lat={lat}&lon={lon}&radius_km={radius_km}
async fn nearby_posts(state: web::Data<AppState>, query: web::Query<NearbyQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    let bbox = bounding_box(query.lat, query.lon, query.radius_km);

    let candidates = match state.store.list_located_posts(None, &bbox).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("Failed to query located posts: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    let results: Vec<NearbyPost> =
        filter_within_radius(GeoPoint::new(query.lat, query.lon), query.radius_km, candidates)
            .into_iter()
            .map(|(post, distance_km)| NearbyPost {
                post,
                distance_km: round_km(distance_km),
            })
            .collect();

    tracing::debug!(
        "Nearby query at ({}, {}) radius {}km returned {} posts",
        query.lat,
        query.lon,
        query.radius_km,
        results.len()
    );

    HttpResponse::Ok().json(results)
}

/// Fetch one post
///
/// GET /api/v1/posts/{post_id}
async fn get_post(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let post_id = path.into_inner();

    match state.store.get_post(post_id).await {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Post not found")),
        Err(e) => {
            tracing::error!("Failed to fetch post {}: {}", post_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Update a post's title and/or content
///
/// PUT /api/v1/posts/{post_id}
async fn update_post(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    req: web::Json<UpdatePostRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    let post_id = path.into_inner();

    match state
        .store
        .update_post(post_id, req.title.as_deref(), req.content.as_deref())
        .await
    {
        Ok(Some(_)) => HttpResponse::Ok().json(MessageResponse::new("Post updated successfully")),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Post not found")),
        Err(e) => {
            tracing::error!("Failed to update post {}: {}", post_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Delete a post
///
/// DELETE /api/v1/posts/{post_id}
async fn delete_post(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    match state.store.delete_post(post_id).await {
        Ok(true) => HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Post not found")),
        Err(e) => {
            tracing::error!("Failed to delete post {}: {}", post_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}
