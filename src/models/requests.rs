use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn default_nearby_radius_km() -> f64 {
    5.0
}

fn default_interest_radius_km() -> f64 {
    10.0
}

// Latitude and longitude are only meaningful together; reject lone halves
// before they reach the core (which would silently skip them).
fn coordinates_paired(lat: &Option<f64>, lon: &Option<f64>) -> Result<(), ValidationError> {
    if lat.is_some() != lon.is_some() {
        return Err(ValidationError::new(
            "latitude and longitude must be provided together",
        ));
    }
    Ok(())
}

/// Request to register a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 80))]
    pub username: String,
    // max matches the column width; overlong input is a 400, not a store error
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Request to log in, by username or email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request to create a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_post_coordinates"))]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

fn validate_post_coordinates(req: &CreatePostRequest) -> Result<(), ValidationError> {
    coordinates_paired(&req.latitude, &req.longitude)
}

/// Partial update of a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Request to create a service request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_service_request_coordinates"))]
pub struct CreateServiceRequestRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default = "default_interest_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
}

fn validate_service_request_coordinates(
    req: &CreateServiceRequestRequest,
) -> Result<(), ValidationError> {
    coordinates_paired(&req.latitude, &req.longitude)
}

/// Request to create a service offer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_offer_coordinates"))]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default = "default_interest_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
}

fn validate_offer_coordinates(req: &CreateOfferRequest) -> Result<(), ValidationError> {
    coordinates_paired(&req.latitude, &req.longitude)
}

/// Query parameters for the nearby-posts endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[serde(default = "default_nearby_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
}

/// Query parameters for the post listing endpoint.
///
/// Offset mode (`page`/`limit`), cursor mode (`after_id`) and spatial mode
/// (`lat`/`lon`/`radius_km`) are selected by which parameters are present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_list_coordinates"))]
pub struct ListPostsQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub after_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub radius_km: Option<f64>,
}

fn validate_list_coordinates(query: &ListPostsQuery) -> Result<(), ValidationError> {
    coordinates_paired(&query.lat, &query.lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_rejects_lone_latitude() {
        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: "Content".to_string(),
            category: None,
            location: None,
            latitude: Some(1.0),
            longitude: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_post_accepts_no_coordinates() {
        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: "Content".to_string(),
            category: None,
            location: None,
            latitude: None,
            longitude: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: "Content".to_string(),
            category: None,
            location: None,
            latitude: Some(91.0),
            longitude: Some(0.0),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_overlong_email_rejected() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            // Well-formed address, but longer than the store accepts
            email: format!("{}@example.com", "a".repeat(95)),
            password: "long-enough-password".to_string(),
        };
        assert!(req.validate().is_err());

        let ok = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_service_request_default_radius() {
        let req: CreateServiceRequestRequest = serde_json::from_value(serde_json::json!({
            "title": "Fix my sink",
            "description": "Leaking pipe",
            "category": "plumbing"
        }))
        .unwrap();

        assert_eq!(req.radius_km, 10.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let req: NearbyQuery = serde_json::from_value(serde_json::json!({
            "lat": 1.0,
            "lon": 1.0,
            "radius_km": -5.0
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
