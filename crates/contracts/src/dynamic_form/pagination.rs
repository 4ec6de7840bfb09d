//! Splitting a form into steps of `limit` fields
//!
//! The current page is owned by the caller (the frontend keeps it in the
//! `page` query parameter). Every operation takes the cursor and returns the
//! new one, so the arithmetic stays testable without a router.

use crate::config::LibraryConfig;

/// Slice boundaries of the visible fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// First visible index (inclusive)
    pub first: usize,
    /// Last visible index (exclusive)
    pub last: usize,
    pub total_pages: usize,
    /// 1-based
    pub current_page: usize,
}

/// One entry of the form stepper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormPagination {
    len: usize,
    paginated: bool,
    limit: usize,
}

impl FormPagination {
    pub fn new(len: usize, paginated: bool, limit: Option<usize>) -> Self {
        Self {
            len,
            paginated,
            limit: limit.unwrap_or(0),
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn total_pages(&self) -> usize {
        if self.limit > 0 {
            self.len.div_ceil(self.limit)
        } else {
            0
        }
    }

    pub fn window(&self, page: usize) -> PageWindow {
        let first = page.saturating_sub(1) * self.limit;
        PageWindow {
            first,
            last: first + self.limit,
            total_pages: self.total_pages(),
            current_page: page,
        }
    }

    pub fn is_visible(&self, index: usize, page: usize) -> bool {
        if !self.paginated {
            return true;
        }
        let window = self.window(page);
        index >= window.first && index < window.last
    }

    /// Fields shown on `page`, in display order
    pub fn visible<'a, T>(&self, items: &'a [T], page: usize) -> Vec<&'a T> {
        items
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_visible(*index, page))
            .map(|(_, item)| item)
            .collect()
    }

    /// Indices shown on `page`
    pub fn visible_indices(&self, page: usize) -> Vec<usize> {
        (0..self.len).filter(|i| self.is_visible(*i, page)).collect()
    }

    pub fn has_prev(&self, page: usize) -> bool {
        self.paginated && page > 1
    }

    pub fn has_next(&self, page: usize) -> bool {
        self.paginated && page < self.total_pages()
    }

    pub fn prev_page(&self, page: usize) -> usize {
        if self.has_prev(page) {
            page - 1
        } else {
            page
        }
    }

    pub fn next_page(&self, page: usize) -> usize {
        if self.has_next(page) {
            page + 1
        } else {
            page
        }
    }

    /// `target` is applied only when it names an existing page
    pub fn go_to_page(&self, page: usize, target: usize) -> usize {
        if target > 0 && target <= self.total_pages() {
            target
        } else {
            log::debug!(
                "Ignoring navigation to page {} (total pages: {})",
                target,
                self.total_pages()
            );
            page
        }
    }

    /// Zero-based index of the active step
    pub fn active_step(&self, page: usize) -> usize {
        page.saturating_sub(1)
    }

    /// Page holding the field at `index`
    pub fn page_of(&self, index: usize) -> usize {
        if self.limit == 0 {
            1
        } else {
            index / self.limit + 1
        }
    }

    pub fn stepper(&self) -> Vec<Step> {
        self.stepper_with(LibraryConfig::embedded())
    }

    pub fn stepper_with(&self, config: &LibraryConfig) -> Vec<Step> {
        (0..self.total_pages())
            .map(|n| Step {
                label: format!("{} {}", config.pagination.step_label, n + 1),
            })
            .collect()
    }
}

/// Read the page cursor from a query parameter value, defaulting to 1
pub fn page_from_query(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(FormPagination::new(25, true, Some(10)).total_pages(), 3);
        assert_eq!(FormPagination::new(20, true, Some(10)).total_pages(), 2);
        assert_eq!(FormPagination::new(25, true, None).total_pages(), 0);
        assert_eq!(FormPagination::new(0, true, Some(10)).total_pages(), 0);
    }

    #[test]
    fn test_go_to_page_bounds() {
        let pagination = FormPagination::new(25, true, Some(10));
        assert_eq!(pagination.go_to_page(1, 0), 1);
        assert_eq!(pagination.go_to_page(1, 4), 1);

        let page = pagination.go_to_page(1, 2);
        assert_eq!(page, 2);
        let window = pagination.window(page);
        assert_eq!((window.first, window.last), (10, 20));
        assert_eq!(pagination.visible_indices(page), (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_prev_next_are_noops_at_boundaries() {
        let pagination = FormPagination::new(25, true, Some(10));
        assert_eq!(pagination.prev_page(1), 1);
        assert_eq!(pagination.next_page(1), 2);
        assert_eq!(pagination.next_page(3), 3);
        assert_eq!(pagination.prev_page(3), 2);
        assert!(!pagination.has_prev(1));
        assert!(!pagination.has_next(3));
    }

    #[test]
    fn test_unpaginated_shows_everything() {
        let items: Vec<u32> = (0..25).collect();
        let pagination = FormPagination::new(items.len(), false, Some(10));
        assert_eq!(pagination.visible(&items, 2).len(), 25);
        assert!(!pagination.has_next(1));
        assert_eq!(pagination.next_page(1), 1);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<u32> = (0..25).collect();
        let pagination = FormPagination::new(items.len(), true, Some(10));
        let visible = pagination.visible(&items, 3);
        assert_eq!(visible, vec![&20, &21, &22, &23, &24]);
        assert_eq!(pagination.page_of(24), 3);
        assert_eq!(pagination.page_of(9), 1);
    }

    #[test]
    fn test_stepper_and_active_step() {
        let pagination = FormPagination::new(25, true, Some(10));
        let labels: Vec<String> = pagination.stepper().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Etape 1", "Etape 2", "Etape 3"]);
        assert_eq!(pagination.active_step(2), 1);
        assert_eq!(pagination.active_step(0), 0);
    }

    #[test]
    fn test_page_from_query() {
        assert_eq!(page_from_query(None), 1);
        assert_eq!(page_from_query(Some("3")), 3);
        assert_eq!(page_from_query(Some("0")), 1);
        assert_eq!(page_from_query(Some("abc")), 1);
    }
}
