use leptos::*;
use wasm_bindgen::JsCast;

use wasteinfo_app::{App, APP_CONTAINER_ID};

fn main() {
    _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
    log::info!("Start web application");
    let app_container = document()
        .get_element_by_id(APP_CONTAINER_ID)
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());
    match app_container {
        Some(container) => mount_to(container, || view! { <App /> }),
        None => {
            log::debug!("No #{APP_CONTAINER_ID} element found, mount to body");
            mount_to_body(|| view! { <App /> });
        }
    }
}
