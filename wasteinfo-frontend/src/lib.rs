use leptos::*;

use wasteinfo_frontend_api as api;

pub mod autocomplete;
pub mod geolocation;
pub mod lookup;

mod components;
use components::*;

/// Base URL of the waste info service, empty for the serving origin.
pub const DEFAULT_API_URL: &str = match option_env!("WASTE_INFO_API_URL") {
    Some(url) => url,
    None => "",
};

pub const APP_CONTAINER_ID: &str = "app";
pub const LOCATION_INPUT_ID: &str = "location";
pub const LOADING_SPINNER_ID: &str = "loading-spinner";
pub const RESULT_ID: &str = "result";

#[component]
#[must_use]
pub fn App() -> impl IntoView {
    let public_api = api::PublicApi::new(DEFAULT_API_URL.to_owned());
    log::debug!("Using waste info API at '{DEFAULT_API_URL}'");

    view! {
      <main>
        <LocationLookup public_api />
      </main>
    }
}
