pub mod config;
pub mod datatable;
pub mod dynamic_form;
pub mod error;
pub mod shared;
