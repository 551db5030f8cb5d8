//! Pagination primitives shared by the list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    const MAX_PER_PAGE: i64 = 100;
    const DEFAULT_PER_PAGE: i64 = 25;

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    /// Saturates for absurd page numbers; such a page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.current_page() - 1).saturating_mul(self.limit())
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Paged result envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages,
        }
    }

    /// Cut one page out of an already filtered and ordered collection.
    pub fn from_all(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit() as usize)
            .collect();
        Self::new(items, total, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn pagination_clamps_per_page_and_page() {
        let p = Pagination {
            page: Some(-4),
            per_page: Some(500),
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn from_all_slices_requested_page() {
        let p = Pagination {
            page: Some(2),
            per_page: Some(2),
        };
        let result = PagedResult::from_all(vec![1, 2, 3, 4, 5], &p);
        assert_eq!(result.items, vec![3, 4]);
        assert_eq!(result.total, 5);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn from_all_past_the_end_is_empty() {
        let p = Pagination {
            page: Some(9),
            per_page: Some(10),
        };
        let result = PagedResult::from_all(vec!["a", "b"], &p);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 2);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        assert_eq!(p.offset(), i64::MAX);
        let result = PagedResult::from_all(vec![1, 2, 3], &p);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 3);
    }
}
