use contracts::dynamic_form::{FormPagination, PageWindow, Step};
use leptos::prelude::*;

use crate::shared::query::use_query_page;

/// Reactive wrapper around [`FormPagination`]
///
/// `page` is 1-based. When bound to the query string, the page survives a
/// reload through `?page=N`.
#[derive(Clone, Copy)]
pub struct FormPaginationState {
    pub page: RwSignal<usize>,
    pub pagination: Memo<FormPagination>,
}

impl FormPaginationState {
    pub fn window(&self) -> PageWindow {
        self.pagination.get().window(self.page.get())
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.pagination.get().is_visible(index, self.page.get())
    }

    /// Indices of the fields shown on the current page
    pub fn visible_indices(&self) -> Vec<usize> {
        self.pagination.get().visible_indices(self.page.get())
    }

    pub fn has_prev(&self) -> bool {
        self.pagination.get().has_prev(self.page.get())
    }

    pub fn has_next(&self) -> bool {
        self.pagination.get().has_next(self.page.get())
    }

    pub fn prev(&self) {
        let pagination = self.pagination.get_untracked();
        self.page.update(|page| *page = pagination.prev_page(*page));
    }

    pub fn next(&self) {
        let pagination = self.pagination.get_untracked();
        self.page.update(|page| *page = pagination.next_page(*page));
    }

    pub fn go_to(&self, target: usize) {
        let pagination = self.pagination.get_untracked();
        self.page.update(|page| *page = pagination.go_to_page(*page, target));
    }

    pub fn steps(&self) -> Vec<Step> {
        self.pagination.get().stepper()
    }

    pub fn active_step(&self) -> usize {
        self.pagination.get().active_step(self.page.get())
    }

    /// Jump to the page holding the field at `index`
    pub fn reveal(&self, index: usize) {
        let target = self.pagination.get_untracked().page_of(index);
        self.go_to(target);
    }
}

pub fn use_form_pagination(
    len: Signal<usize>,
    paginated: bool,
    limit: Option<usize>,
    query_key: Option<&'static str>,
) -> FormPaginationState {
    let page = match query_key {
        Some(key) if paginated => use_query_page(key),
        _ => RwSignal::new(1),
    };
    let pagination = Memo::new(move |_| FormPagination::new(len.get(), paginated, limit));

    FormPaginationState { page, pagination }
}
