// Unit tests for the LocalLink core

use chrono::Utc;
use locallink_api::core::{
    bounding_box, clamp_limit, filter_within_radius, haversine_km, is_within_bounding_box,
    match_offers, paginate, paginate_after, PageParams,
};
use locallink_api::models::{GeoPoint, Post, ServiceOffer, ServiceRequest};

fn post(id: i64, lat: Option<f64>, lon: Option<f64>) -> Post {
    Post {
        id,
        title: format!("Post {}", id),
        content: "content".to_string(),
        category: None,
        location: None,
        latitude: lat,
        longitude: lon,
        user_id: 1,
        created_at: Utc::now(),
    }
}

fn offer(id: i64, category: &str, lat: Option<f64>, lon: Option<f64>) -> ServiceOffer {
    ServiceOffer {
        id,
        title: format!("Offer {}", id),
        description: "description".to_string(),
        category: category.to_string(),
        hourly_rate: None,
        location: None,
        latitude: lat,
        longitude: lon,
        radius_km: 10.0,
        user_id: 2,
        created_at: Utc::now(),
    }
}

fn request(category: &str, lat: Option<f64>, lon: Option<f64>, radius_km: f64) -> ServiceRequest {
    ServiceRequest {
        id: 1,
        title: "Request".to_string(),
        description: "description".to_string(),
        category: category.to_string(),
        budget: None,
        location: None,
        latitude: lat,
        longitude: lon,
        radius_km,
        user_id: 1,
        created_at: Utc::now(),
    }
}

#[test]
fn test_haversine_zero_for_identical_points() {
    for &(lat, lon) in &[
        (0.0, 0.0),
        (-90.0, -180.0),
        (90.0, 180.0),
        (40.7128, -74.0060),
        (-33.9249, 18.4241),
    ] {
        assert_eq!(haversine_km(lat, lon, lat, lon), 0.0, "at ({}, {})", lat, lon);
    }
}

#[test]
fn test_haversine_symmetry() {
    let pairs = [
        ((51.5074, -0.1278), (48.8566, 2.3522)),
        ((1.0, 1.0), (10.0, 10.0)),
        ((-45.0, 170.0), (45.0, -170.0)),
    ];

    for ((a_lat, a_lon), (b_lat, b_lon)) in pairs {
        assert_eq!(
            haversine_km(a_lat, a_lon, b_lat, b_lon),
            haversine_km(b_lat, b_lon, a_lat, a_lon)
        );
    }
}

#[test]
fn test_haversine_known_distance() {
    // New York to Los Angeles, approximately 3944 km
    let distance = haversine_km(40.7128, -74.0060, 34.0522, -118.2437);
    assert!((distance - 3944.0).abs() < 100.0, "Expected ~3944km, got {}", distance);
}

#[test]
fn test_filter_results_respect_radius() {
    let center = GeoPoint::new(40.7128, -74.0060);
    let radius_km = 20.0;

    let candidates: Vec<Post> = (0..200)
        .map(|i| {
            post(
                i,
                Some(40.7128 + (i as f64 - 100.0) * 0.005),
                Some(-74.0060 + (i as f64 - 100.0) * 0.004),
            )
        })
        .collect();

    let results = filter_within_radius(center, radius_km, candidates);

    for (p, d) in &results {
        let exact = haversine_km(center.lat, center.lon, p.latitude.unwrap(), p.longitude.unwrap());
        assert!((exact - d).abs() < 1e-9);
        assert!(*d <= radius_km + 1e-6, "post {} at {}km exceeds radius", p.id, d);
    }
}

#[test]
fn test_prefilter_never_drops_a_true_match() {
    // Compare the two-phase filter against a brute-force exact scan. The
    // radius is derived from a candidate due north of the center, so the set
    // contains points sitting exactly on the boundary (due north and, by the
    // dlat symmetry of the haversine form, due south), not just a grid that
    // straddles it.
    let center = GeoPoint::new(-33.9249, 18.4241);
    let radius_km = haversine_km(center.lat, center.lon, center.lat + 0.36, center.lon);

    let mut candidates: Vec<Post> = (0..500)
        .map(|i| {
            post(
                i,
                Some(center.lat + ((i * 7) % 100) as f64 * 0.01 - 0.5),
                Some(center.lon + ((i * 13) % 100) as f64 * 0.01 - 0.5),
            )
        })
        .collect();
    candidates.push(post(500, Some(center.lat + 0.36), Some(center.lon)));
    candidates.push(post(501, Some(center.lat - 0.36), Some(center.lon)));

    let brute: Vec<i64> = candidates
        .iter()
        .filter(|p| {
            haversine_km(center.lat, center.lon, p.latitude.unwrap(), p.longitude.unwrap())
                <= radius_km
        })
        .map(|p| p.id)
        .collect();

    let mut filtered: Vec<i64> = filter_within_radius(center, radius_km, candidates)
        .into_iter()
        .map(|(p, _)| p.id)
        .collect();
    filtered.sort_unstable();

    let mut brute_sorted = brute;
    brute_sorted.sort_unstable();

    assert_eq!(filtered, brute_sorted);
}

#[test]
fn test_bounding_box_is_superset_near_poles() {
    // The epsilon guard keeps the longitude band finite at extreme latitudes
    let center = GeoPoint::new(89.5, 0.0);
    let radius_km = 30.0;

    let bbox = bounding_box(center.lat, center.lon, radius_km);

    let candidates = vec![
        post(1, Some(89.5), Some(0.0)),
        post(2, Some(89.6), Some(90.0)),
        post(3, Some(89.4), Some(-120.0)),
    ];

    for p in &candidates {
        let d = haversine_km(center.lat, center.lon, p.latitude.unwrap(), p.longitude.unwrap());
        if d <= radius_km {
            assert!(
                is_within_bounding_box(p.latitude.unwrap(), p.longitude.unwrap(), &bbox),
                "post {} within radius but outside bbox",
                p.id
            );
        }
    }

    let results = filter_within_radius(center, radius_km, candidates);
    assert!(!results.is_empty());
}

#[test]
fn test_spatial_filter_concrete_scenario() {
    // Center (1.0, 1.0), radius 50km: only the co-located candidate matches
    let candidates = vec![
        post(1, Some(1.0), Some(1.0)),
        post(2, Some(10.0), Some(10.0)),
    ];

    let results = filter_within_radius(GeoPoint::new(1.0, 1.0), 50.0, candidates);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.id, 1);
    assert!(results[0].1.abs() < 1e-6);
}

#[test]
fn test_match_same_category_beats_closer_other_category() {
    let req = request("plumbing", Some(0.0), Some(0.0), 10.0);

    let pool = vec![
        // Same category, ~5km north
        offer(1, "plumbing", Some(0.045), Some(0.0)),
        // Different category, ~1km north
        offer(2, "gardening", Some(0.009), Some(0.0)),
    ];

    let result = match_offers(&req, pool);

    assert_eq!(result.offers.len(), 1);
    assert_eq!(result.offers[0].id, 1);
}

#[test]
fn test_match_without_request_coordinates_is_empty() {
    let req = request("plumbing", None, None, 10.0);
    let pool = vec![offer(1, "plumbing", Some(0.0), Some(0.0))];

    let result = match_offers(&req, pool);
    assert!(result.offers.is_empty());
}

#[test]
fn test_match_skips_unlocated_offers() {
    let req = request("plumbing", Some(0.0), Some(0.0), 10.0);
    let pool = vec![
        offer(1, "plumbing", None, None),
        offer(2, "plumbing", Some(0.01), Some(0.0)),
    ];

    let result = match_offers(&req, pool);
    assert_eq!(result.offers.len(), 1);
    assert_eq!(result.offers[0].id, 2);
}

#[test]
fn test_pagination_25_items() {
    let items: Vec<Post> = (1..=25).map(|id| post(id, None, None)).collect();

    let page2 = paginate(items.clone(), PageParams::new(Some(2), Some(20)));
    let ids: Vec<i64> = page2.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, (21..=25).collect::<Vec<i64>>());
    assert_eq!(page2.total, 25);

    let page3 = paginate(items, PageParams::new(Some(3), Some(20)));
    assert!(page3.items.is_empty());
    assert_eq!(page3.total, 25);
    assert_eq!(page3.page, 3);
    assert_eq!(page3.limit, 20);
}

#[test]
fn test_cursor_pagination_over_20_items() {
    let items: Vec<Post> = (1..=20).map(|id| post(id, None, None)).collect();

    let page = paginate_after(items, 10, 5);
    let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![11, 12, 13, 14, 15]);
    assert_eq!(page.next_cursor, Some(15));
}

#[test]
fn test_limit_clamped_to_valid_range() {
    assert_eq!(clamp_limit(Some(500)), 100);
    assert_eq!(clamp_limit(Some(0)), 1);
    assert_eq!(clamp_limit(None), 20);
}
