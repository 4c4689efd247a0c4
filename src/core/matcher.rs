use crate::core::filters::filter_within_radius;
use crate::models::{Located, ServiceOffer, ServiceRequest};

/// Result of matching a service request against an offer pool
#[derive(Debug)]
pub struct MatchResult {
    pub offers: Vec<ServiceOffer>,
    pub total_candidates: usize,
}

/// Match a service request against a pool of offers.
///
/// The observable policy: same category (exact, case-sensitive) + within the
/// request's radius of interest + nearest first. A request without
/// coordinates matches nothing; that is an empty result, not an error.
pub fn match_offers(request: &ServiceRequest, offer_pool: Vec<ServiceOffer>) -> MatchResult {
    let total_candidates = offer_pool.len();

    let center = match request.location() {
        Some(point) => point,
        None => {
            return MatchResult {
                offers: Vec::new(),
                total_candidates,
            };
        }
    };

    let same_category: Vec<ServiceOffer> = offer_pool
        .into_iter()
        .filter(|offer| offer.category == request.category)
        .collect();

    let offers = filter_within_radius(center, request.radius_km, same_category)
        .into_iter()
        .map(|(offer, _distance_km)| offer)
        .collect();

    MatchResult {
        offers,
        total_candidates,
    }
}
