pub mod app;
pub mod datatable;
pub mod dynamic_form;
pub mod shared;

use contracts::config::LibraryConfig;
use wasm_bindgen::prelude::wasm_bindgen;

/// Install the console logger at the configured level and the panic hook
pub fn init_logging(config: &LibraryConfig) {
    // повторная инициализация возвращает ошибку, её можно игнорировать
    _ = console_log::init_with_level(config.log_level());
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn hydrate() {
    init_logging(LibraryConfig::embedded());

    leptos::mount::mount_to_body(app::App);
}

#[wasm_bindgen(start)]
pub fn start() {
    hydrate();
}
