//! Server-paginated datatable

pub mod api;
mod component;
pub mod local;

pub use api::{http_deleter, http_fetcher, http_one_fetcher, http_uploader, page_query};
pub use component::Datatable;
pub use local::{local_fetcher, paginate_local};
