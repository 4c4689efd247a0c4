// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod paging;

pub use distance::{bounding_box, haversine_km, is_within_bounding_box};
pub use filters::filter_within_radius;
pub use matcher::{match_offers, MatchResult};
pub use paging::{clamp_limit, paginate, paginate_after, CursorPage, Page, PageParams};
