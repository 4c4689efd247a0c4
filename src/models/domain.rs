use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Anything with an id and an optional location that can enter a spatial query.
///
/// Entities without coordinates are skipped by the spatial filter; they are
/// never treated as sitting at (0, 0).
pub trait Located {
    fn entity_id(&self) -> i64;
    fn location(&self) -> Option<GeoPoint>;
}

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Community post, optionally pinned to a location
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A request for a service in some category, with a radius of interest
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub radius_km: f64,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An offer to provide a service in some category
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceOffer {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub radius_km: f64,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// Coordinates are only meaningful as a pair; a lone latitude or longitude
// yields no location.
fn paired(lat: Option<f64>, lon: Option<f64>) -> Option<GeoPoint> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    }
}

impl Located for Post {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn location(&self) -> Option<GeoPoint> {
        paired(self.latitude, self.longitude)
    }
}

impl Located for ServiceRequest {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn location(&self) -> Option<GeoPoint> {
        paired(self.latitude, self.longitude)
    }
}

impl Located for ServiceOffer {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn location(&self) -> Option<GeoPoint> {
        paired(self.latitude, self.longitude)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
