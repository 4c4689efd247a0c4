use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::AuthUser;
use crate::models::{ErrorResponse, LoginRequest, MessageResponse, RegisterRequest, TokenResponse};
use crate::routes::AppState;
use crate::services::StoreError;

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(state: web::Data<AppState>, req: web::Json<RegisterRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    match state.store.find_user_by_username(&req.username).await {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("conflict", "Username already exists"));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to look up username {}: {}", req.username, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    }

    match state.store.find_user_by_email(&req.email).await {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("conflict", "Email already registered"));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to look up email: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    }

    let password_hash = match state.auth.hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("hash_error", "Failed to process password"));
        }
    };

    match state
        .store
        .insert_user(&req.username, &req.email, &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!("Registered user {} (id {})", user.username, user.id);
            HttpResponse::Created().json(MessageResponse::new("User registered successfully"))
        }
        // Lost a race with a concurrent registration
        Err(StoreError::Conflict(msg)) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request("conflict", msg))
        }
        Err(e) => {
            tracing::error!("Failed to insert user: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}

/// Log in by username or email
///
/// POST /api/v1/auth/login
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("validation_failed", errors.to_string()));
    }

    let lookup = if let Some(username) = req.username.as_deref() {
        state.store.find_user_by_username(username).await
    } else if let Some(email) = req.email.as_deref() {
        state.store.find_user_by_email(email).await
    } else {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "validation_failed",
            "username or email is required",
        ));
    };

    let user = match lookup {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::unauthorized("Invalid credentials"));
        }
        Err(e) => {
            tracing::error!("User lookup failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()));
        }
    };

    match state.auth.verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::unauthorized("Invalid credentials"));
        }
        Err(e) => {
            tracing::error!("Password verification failed for user {}: {}", user.id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("hash_error", "Failed to verify password"));
        }
    }

    match state.auth.issue_token(user.id) {
        Ok(access_token) => {
            tracing::debug!("Issued token for user {}", user.id);
            HttpResponse::Ok().json(TokenResponse { access_token })
        }
        Err(e) => {
            tracing::error!("Token issuance failed for user {}: {}", user.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("token_error", "Failed to issue token"))
        }
    }
}

/// Return the authenticated caller's account
///
/// GET /api/v1/auth/me
async fn me(state: web::Data<AppState>, auth: AuthUser) -> impl Responder {
    match state.store.get_user(auth.user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("User not found")),
        Err(e) => {
            tracing::error!("Failed to fetch user {}: {}", auth.user_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal("store_error", e.to_string()))
        }
    }
}
