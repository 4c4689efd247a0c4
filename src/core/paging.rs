use serde::Serialize;

use crate::models::Located;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Clamp a requested page size into [1, MAX_LIMIT], defaulting to DEFAULT_LIMIT
#[inline]
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Offset/limit pagination parameters, normalized
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: clamp_limit(limit),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// One page of an offset-paginated collection
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
}

/// Take one page out of an already-filtered, already-ordered collection.
///
/// A page past the end returns empty items with valid metadata.
pub fn paginate<T>(items: Vec<T>, params: PageParams) -> Page<T> {
    let total = items.len();
    let items: Vec<T> = items
        .into_iter()
        .skip(params.offset())
        .take(params.limit as usize)
        .collect();

    Page {
        items,
        page: params.page,
        limit: params.limit,
        total,
    }
}

/// One page of a cursor-paginated collection
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<i64>,
}

/// Cursor pagination: items with id > `after_id`, ascending by id.
///
/// `next_cursor` is the last returned id, or `None` when nothing with a
/// larger id remains. Stable under concurrent inserts, unlike offsets.
pub fn paginate_after<T: Located>(items: Vec<T>, after_id: i64, limit: u32) -> CursorPage<T> {
    let mut items: Vec<T> = items
        .into_iter()
        .filter(|item| item.entity_id() > after_id)
        .collect();
    items.sort_by_key(|item| item.entity_id());

    let has_more = items.len() > limit as usize;
    items.truncate(limit as usize);

    let next_cursor = if has_more {
        items.last().map(|item| item.entity_id())
    } else {
        None
    };

    CursorPage { items, next_cursor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

    fn posts(count: i64) -> Vec<Post> {
        (1..=count)
            .map(|id| Post {
                id,
                title: format!("Post {}", id),
                content: "content".to_string(),
                category: None,
                location: None,
                latitude: None,
                longitude: None,
                user_id: 1,
                created_at: chrono::Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(1000)), 100);
    }

    #[test]
    fn test_page_defaults() {
        let params = PageParams::new(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset(), 0);

        let params = PageParams::new(Some(0), None);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_paginate_second_page_of_25() {
        let page = paginate(posts(25), PageParams::new(Some(2), Some(20)));

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, 21);
        assert_eq!(page.items[4].id, 25);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 20);
    }

    #[test]
    fn test_paginate_past_the_end() {
        let page = paginate(posts(25), PageParams::new(Some(3), Some(20)));

        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_cursor_middle_page() {
        let page = paginate_after(posts(20), 10, 5);

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
        assert_eq!(page.next_cursor, Some(15));
    }

    #[test]
    fn test_cursor_final_page_has_no_cursor() {
        let page = paginate_after(posts(20), 15, 5);

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![16, 17, 18, 19, 20]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_cursor_past_the_end() {
        let page = paginate_after(posts(20), 100, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
