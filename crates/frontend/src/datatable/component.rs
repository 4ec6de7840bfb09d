use std::collections::BTreeMap;

use contracts::datatable::{
    DatatableHeader, DatatableSelectEvent, PageRequest, Selection, SortState, DEFAULT_PAGE_NUMBER,
};
use contracts::dynamic_form::hydrate_attrs::option_pairs;
use contracts::dynamic_form::{FieldKind, Fetcher, Record};
use contracts::shared::global::dynamic_error;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::shared::components::PaginationControls;
use crate::shared::config::{page_limit, use_library_config};
use crate::shared::icons::icon;

/// Input rendered in the filter row for a column filter
fn filter_input(header: &DatatableHeader, filters: RwSignal<BTreeMap<String, String>>) -> AnyView {
    let Some(kind) = header.filter.as_ref() else {
        return ().into_any();
    };
    let id = header.id.clone();
    let current = {
        let id = id.clone();
        move || filters.with(|f| f.get(&id).cloned().unwrap_or_default())
    };
    let set = move |value: String| {
        filters.update(|f| {
            f.insert(id.clone(), value);
        })
    };

    match kind {
        FieldKind::Select(select) => {
            let options = option_pairs(
                &select.select_option,
                select.select_value.as_deref(),
                select.select_label.as_deref(),
            );
            view! {
                <select
                    class="form__select datatable__filter"
                    prop:value=current
                    on:change=move |ev| set(event_target_value(&ev))
                >
                    <option value="">"Tous"</option>
                    {options
                        .into_iter()
                        .map(|(value, label)| view! { <option value=value>{label}</option> })
                        .collect_view()}
                </select>
            }
            .into_any()
        }
        other => {
            let input_type = if matches!(other, FieldKind::Number(_)) { "number" } else { "text" };
            view! {
                <input
                    type=input_type
                    class="form__input datatable__filter"
                    prop:value=current
                    on:input=move |ev| set(event_target_value(&ev))
                />
            }
            .into_any()
        }
    }
}

/// First page when `current` is elsewhere; `None` leaves the page signal untouched
fn page_reset(current: usize) -> Option<usize> {
    (current != DEFAULT_PAGE_NUMBER).then_some(DEFAULT_PAGE_NUMBER)
}

/// Server-paginated table
///
/// Every change of page, page size, sort, filter or search sends a new
/// `PageRequest` through `fetcher`; responses of superseded requests are
/// dropped.
#[component]
pub fn Datatable(
    /// Column definitions
    headers: Vec<DatatableHeader>,
    /// Loads one page of rows
    fetcher: Fetcher,
    /// Initial page size, the configured default when absent
    #[prop(optional)]
    limit: Option<usize>,
    /// Record field identifying a row; enables the selection column
    #[prop(optional, into)]
    row_key: Option<String>,
    /// Called on every selection change
    #[prop(optional)]
    on_select: Option<Callback<DatatableSelectEvent>>,
    /// Shows the global search box
    #[prop(optional)]
    searchable: bool,
    /// Bump to reload the current page
    #[prop(optional, into)]
    refresh: MaybeProp<u32>,
) -> impl IntoView {
    let page_index = RwSignal::new(DEFAULT_PAGE_NUMBER);
    let page_size = RwSignal::new(page_limit(limit, &use_library_config()));
    let sort = RwSignal::new(None::<SortState>);
    let filters = RwSignal::new(BTreeMap::<String, String>::new());
    let search = RwSignal::new(String::new());

    let rows = RwSignal::new(Vec::<Record>::new());
    let total_count = RwSignal::new(0usize);
    let total_pages = RwSignal::new(0usize);
    let (loading, set_loading) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let request_id = StoredValue::new(0u64);

    let selectable = row_key.is_some();
    let selection = RwSignal::new(Selection::new(row_key.unwrap_or_default()));

    Effect::new(move |_| {
        let _ = refresh.get();
        let request = PageRequest::from_table_state(
            page_index.get(),
            page_size.get(),
            sort.get().as_ref(),
            &filters.get(),
            &search.get(),
        );
        let current = request_id.get_value() + 1;
        request_id.set_value(current);
        let fetcher = fetcher.clone();

        spawn_local(async move {
            set_loading.set(true);
            let result = fetcher.call(request).await;
            if request_id.get_value() != current {
                log::debug!("datatable: dropping response of request {}", current);
                return;
            }
            match result {
                Ok(data) => {
                    total_count.set(data.total as usize);
                    total_pages.set(data.total_pages() as usize);
                    rows.set(data.data);
                    set_error.set(None);
                }
                Err(err) => {
                    log::error!("datatable fetch failed: {}", err);
                    set_error.set(Some(dynamic_error(&err)));
                }
            }
            set_loading.set(false);
        });
    });

    let emit = move |event: DatatableSelectEvent| {
        selection.update(|s| s.apply(&event));
        if let Some(handler) = on_select {
            handler.run(event);
        }
    };

    let toggle_sort = move |field: String| {
        sort.update(|current| *current = Some(SortState::toggle(current.as_ref(), &field)));
        page_index.set(DEFAULT_PAGE_NUMBER);
    };

    // Фильтр или поиск возвращают на первую страницу
    Effect::new(move |_| {
        filters.track();
        search.track();
        if let Some(first) = page_reset(page_index.get_untracked()) {
            page_index.set(first);
        }
    });

    let has_filters = headers.iter().any(|h| h.filter.is_some());
    let all_selected = move || {
        rows.with(|r| !r.is_empty() && selection.with(|s| r.iter().all(|row| s.is_selected(row))))
    };
    let column_count = headers.len() + usize::from(selectable);

    let header_cells = headers
        .iter()
        .map(|header| {
            let label = header.label.clone();
            let field = header.id.clone();
            let class = if header.no_wrap_header { "datatable__header--nowrap" } else { "" };
            if header.sortable {
                let indicator_field = field.clone();
                view! {
                    <TableHeaderCell class=class>
                        <div class="table__sortable-header" style="cursor: pointer;" on:click=move |_| toggle_sort(field.clone())>
                            {label}
                            <span class="table__sort-indicator">
                                {move || sort.with(|s| SortState::indicator(s.as_ref(), &indicator_field))}
                            </span>
                        </div>
                    </TableHeaderCell>
                }
                .into_any()
            } else {
                view! { <TableHeaderCell class=class>{label}</TableHeaderCell> }.into_any()
            }
        })
        .collect_view();

    let filter_cells = headers
        .iter()
        .map(|header| {
            let input = filter_input(header, filters);
            view! { <TableCell>{input}</TableCell> }
        })
        .collect_view();

    let body_headers = headers.clone();

    view! {
        <div class="datatable">
            {searchable.then(|| view! {
                <div class="datatable__search">
                    {icon("search")}
                    <input
                        type="search"
                        class="form__input"
                        placeholder="Rechercher"
                        prop:value=move || search.get()
                        on:input=move |ev| search.set(event_target_value(&ev))
                    />
                </div>
            })}
            {move || error.get().map(|message| view! {
                <div class="datatable__error">{message}</div>
            })}
            <Table>
                <TableHeader>
                    <TableRow>
                        {selectable.then(|| view! {
                            <TableHeaderCell class="datatable__select">
                                <input
                                    type="checkbox"
                                    prop:checked=all_selected
                                    on:change=move |ev| {
                                        let checked = event_target_checked(&ev);
                                        emit(rows.with_untracked(|r| Selection::all_event(r, checked)));
                                    }
                                />
                            </TableHeaderCell>
                        })}
                        {header_cells}
                    </TableRow>
                    {has_filters.then(|| view! {
                        <TableRow>
                            {selectable.then(|| view! { <TableCell>""</TableCell> })}
                            {filter_cells}
                        </TableRow>
                    })}
                </TableHeader>
                <TableBody>
                    {move || {
                        if loading.get() && rows.with(Vec::is_empty) {
                            return view! {
                                <TableRow>
                                    <TableCell attr:colspan=column_count.to_string()>
                                        <Flex gap=FlexGap::Small>
                                            <Spinner size=SpinnerSize::Small />
                                            "Chargement..."
                                        </Flex>
                                    </TableCell>
                                </TableRow>
                            }
                            .into_any();
                        }
                        if rows.with(Vec::is_empty) {
                            return view! {
                                <TableRow>
                                    <TableCell attr:colspan=column_count.to_string()>"Aucune donnée"</TableCell>
                                </TableRow>
                            }
                            .into_any();
                        }
                        let headers = body_headers.clone();
                        rows.get()
                            .into_iter()
                            .map(|row| {
                                let checked_row = row.clone();
                                let event_row = row.clone();
                                let cells = headers
                                    .iter()
                                    .map(|header| {
                                        let text = header.display(&row);
                                        let class = if header.numeric { "datatable__cell--numeric" } else { "" };
                                        view! {
                                            <TableCell class=class>
                                                <TableCellLayout truncate=true>{text}</TableCellLayout>
                                            </TableCell>
                                        }
                                    })
                                    .collect_view();
                                view! {
                                    <TableRow>
                                        {selectable.then(|| view! {
                                            <TableCell class="datatable__select">
                                                <input
                                                    type="checkbox"
                                                    prop:checked=move || selection.with(|s| s.is_selected(&checked_row))
                                                    on:change=move |ev| {
                                                        emit(Selection::row_event(&event_row, event_target_checked(&ev)));
                                                    }
                                                />
                                            </TableCell>
                                        })}
                                        {cells}
                                    </TableRow>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }}
                </TableBody>
            </Table>
            <PaginationControls
                current_page=page_index
                total_pages=total_pages
                total_count=total_count
                page_size=page_size
                on_page_change=Callback::new(move |page: usize| page_index.set(page))
                on_page_size_change=Callback::new(move |size: usize| {
                    page_size.set(size);
                    page_index.set(DEFAULT_PAGE_NUMBER);
                })
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_reset_only_away_from_first_page() {
        assert_eq!(page_reset(DEFAULT_PAGE_NUMBER), None);
        assert_eq!(page_reset(3), Some(DEFAULT_PAGE_NUMBER));
    }
}
