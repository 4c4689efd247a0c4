// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, GeoPoint, Located, Post, ServiceOffer, ServiceRequest, User};
pub use requests::{
    CreateOfferRequest, CreatePostRequest, CreateServiceRequestRequest, ListPostsQuery,
    LoginRequest, NearbyQuery, RegisterRequest, UpdatePostRequest,
};
pub use responses::{
    CreatedResponse, ErrorResponse, HealthResponse, MatchOffersResponse, MessageResponse,
    NearbyPost, TokenResponse,
};
