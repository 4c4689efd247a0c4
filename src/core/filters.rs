use crate::core::distance::{bounding_box, haversine_km, is_within_bounding_box};
use crate::models::{GeoPoint, Located};

/// Filter candidates to those within `radius_km` of `center`, nearest first.
///
/// Two-phase: a cheap bounding-box pre-filter discards most non-matches, then
/// the exact haversine distance is computed for the survivors. The boundary is
/// inclusive (`distance <= radius_km`). Candidates without coordinates are
/// skipped, not errors.
///
/// Results are ordered by ascending distance; ties break on ascending entity
/// id so the ordering is deterministic.
pub fn filter_within_radius<T: Located>(
    center: GeoPoint,
    radius_km: f64,
    candidates: Vec<T>,
) -> Vec<(T, f64)> {
    let bbox = bounding_box(center.lat, center.lon, radius_km);

    let mut results: Vec<(T, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let point = candidate.location()?;

            // Stage 1: bounding-box pre-filter
            if !is_within_bounding_box(point.lat, point.lon, &bbox) {
                return None;
            }

            // Stage 2: exact distance
            let distance_km = haversine_km(center.lat, center.lon, point.lat, point.lon);
            if distance_km <= radius_km {
                Some((candidate, distance_km))
            } else {
                None
            }
        })
        .collect();

    results.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.entity_id().cmp(&b.0.entity_id()))
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

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
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_filter_keeps_near_drops_far() {
        let candidates = vec![
            post(1, Some(1.0), Some(1.0)),
            post(2, Some(10.0), Some(10.0)),
        ];

        let results = filter_within_radius(GeoPoint::new(1.0, 1.0), 50.0, candidates);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, 1);
        assert!(results[0].1 < 1e-6, "distance should be ~0, got {}", results[0].1);
    }

    #[test]
    fn test_filter_skips_missing_coordinates() {
        let candidates = vec![
            post(1, None, None),
            post(2, Some(1.0), None),
            post(3, None, Some(1.0)),
            post(4, Some(1.0), Some(1.0)),
        ];

        let results = filter_within_radius(GeoPoint::new(1.0, 1.0), 5.0, candidates);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, 4);
    }

    #[test]
    fn test_filter_sorted_by_distance_then_id() {
        let candidates = vec![
            post(3, Some(1.1), Some(1.0)),
            post(1, Some(1.0), Some(1.0)),
            // Same location as id 3, tie broken by id
            post(2, Some(1.1), Some(1.0)),
        ];

        let results = filter_within_radius(GeoPoint::new(1.0, 1.0), 50.0, candidates);

        let ids: Vec<i64> = results.iter().map(|(p, _)| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_boundary_is_inclusive() {
        // ~0.09 degrees of latitude is ~10.02 km; pick a radius just at it
        let candidates = vec![post(1, Some(1.09), Some(1.0))];
        let center = GeoPoint::new(1.0, 1.0);
        let exact = haversine_km(1.0, 1.0, 1.09, 1.0);

        let results = filter_within_radius(center, exact, candidates);
        assert_eq!(results.len(), 1, "entity exactly at the radius must be included");
    }

    #[test]
    fn test_empty_candidates_is_empty_result() {
        let results = filter_within_radius(GeoPoint::new(0.0, 0.0), 10.0, Vec::<Post>::new());
        assert!(results.is_empty());
    }

    #[test]
    fn test_prefilter_agrees_with_brute_force() {
        // The bounding box must never exclude a true match; compare against a
        // plain O(n) exact-distance scan over a grid of candidates.
        let center = GeoPoint::new(40.7128, -74.0060);
        let radius_km = 25.0;

        let mut candidates = Vec::new();
        let mut id = 0;
        for i in -20..=20 {
            for j in -20..=20 {
                id += 1;
                candidates.push(post(
                    id,
                    Some(center.lat + i as f64 * 0.02),
                    Some(center.lon + j as f64 * 0.02),
                ));
            }
        }

        let brute_force: Vec<i64> = candidates
            .iter()
            .filter(|p| {
                haversine_km(center.lat, center.lon, p.latitude.unwrap(), p.longitude.unwrap())
                    <= radius_km
            })
            .map(|p| p.id)
            .collect();

        let filtered = filter_within_radius(center, radius_km, candidates);
        let mut filtered_ids: Vec<i64> = filtered.iter().map(|(p, _)| p.id).collect();
        filtered_ids.sort_unstable();

        assert_eq!(filtered_ids, brute_force);

        // And every returned distance respects the radius
        for (_, d) in &filtered {
            assert!(*d <= radius_km + 1e-6);
        }
    }
}
