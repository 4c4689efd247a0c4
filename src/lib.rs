//! LocalLink API - community services backend with geo-proximity matching
//!
//! The core is a small set of pure functions: haversine distance, a two-phase
//! spatial filter (bounding-box prefilter + exact distance), category-based
//! request/offer matching, and offset/cursor pagination. The HTTP layer is a
//! thin CRUD shell around them.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    bounding_box, filter_within_radius, haversine_km, match_offers, paginate, paginate_after,
    MatchResult, Page, PageParams,
};
pub use crate::models::{GeoPoint, Located, Post, ServiceOffer, ServiceRequest, User};
