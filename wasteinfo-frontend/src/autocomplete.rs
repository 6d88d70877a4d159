use anyhow::{anyhow, bail};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::HtmlInputElement;

use wasteinfo_boundary::Coordinate;

const PLACE_TYPES: &[&str] = &["(cities)"];
const PLACE_FIELDS: &[&str] = &["place_id", "name", "formatted_address", "geometry"];
const PLACE_CHANGED_EVENT: &str = "place_changed";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps", "places"])]
    #[derive(Clone)]
    type Autocomplete;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps", "places"], catch)]
    fn new(input: &HtmlInputElement, options: &Object) -> Result<Autocomplete, JsValue>;

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_listener(
        this: &Autocomplete,
        event_name: &str,
        handler: &Closure<dyn FnMut()>,
    ) -> MapsEventListener;

    #[wasm_bindgen(method, js_name = getPlace)]
    fn get_place(this: &Autocomplete) -> PlaceResult;

    type MapsEventListener;

    #[wasm_bindgen(method)]
    fn remove(this: &MapsEventListener);

    type PlaceResult;

    #[wasm_bindgen(method, getter)]
    fn place_id(this: &PlaceResult) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn name(this: &PlaceResult) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn formatted_address(this: &PlaceResult) -> Option<String>;

    #[wasm_bindgen(method, getter)]
    fn geometry(this: &PlaceResult) -> Option<PlaceGeometry>;

    type PlaceGeometry;

    #[wasm_bindgen(method, getter)]
    fn location(this: &PlaceGeometry) -> Option<LatLng>;

    type LatLng;

    #[wasm_bindgen(method)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method)]
    fn lng(this: &LatLng) -> f64;
}

/// A place picked from the suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSelection {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Coordinate,
}

impl PlaceSelection {
    fn from_place(place: &PlaceResult) -> Option<Self> {
        let location = place.geometry()?.location()?;
        Some(Self {
            place_id: place.place_id(),
            name: place.name(),
            formatted_address: place.formatted_address(),
            location: Coordinate {
                lat: location.lat(),
                lng: location.lng(),
            },
        })
    }
}

/// When to bind the autocomplete to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTime {
    Now,
    /// The maps script is usually loaded asynchronously,
    /// so wait for the window `load` event.
    OnPageLoad,
}

impl BindingTime {
    #[must_use]
    pub fn determine(library_loaded: bool, document_ready_state: &str) -> Self {
        if library_loaded || document_ready_state == "complete" {
            Self::Now
        } else {
            Self::OnPageLoad
        }
    }

    #[must_use]
    pub fn current() -> Self {
        let ready_state = web_sys::window()
            .and_then(|window| window.document())
            .map(|document| document.ready_state())
            .unwrap_or_default();
        Self::determine(places_library_loaded(), &ready_state)
    }
}

/// Places autocomplete attached to the location input.
///
/// The `place_changed` listener stays registered as long as this
/// handle is alive.
pub struct PlaceAutocomplete {
    listener: MapsEventListener,
    _on_place_changed: Closure<dyn FnMut()>,
}

impl PlaceAutocomplete {
    pub fn bind(input: &HtmlInputElement) -> anyhow::Result<Self> {
        if !places_library_loaded() {
            bail!("google.maps.places is not loaded");
        }
        let widget = Autocomplete::new(input, &autocomplete_options()?).map_err(js_error)?;
        let on_place_changed = {
            let widget = widget.clone();
            Closure::<dyn FnMut()>::new(move || {
                // TODO: decide whether the selected coordinates should replace the typed text on submit
                if let Some(selection) = PlaceSelection::from_place(&widget.get_place()) {
                    log::info!("Selected place: {selection:?}");
                }
            })
        };
        let listener = widget.add_listener(PLACE_CHANGED_EVENT, &on_place_changed);
        log::debug!("Places autocomplete is bound to the location input");
        Ok(Self {
            listener,
            _on_place_changed: on_place_changed,
        })
    }
}

impl Drop for PlaceAutocomplete {
    fn drop(&mut self) {
        self.listener.remove();
    }
}

fn autocomplete_options() -> anyhow::Result<Object> {
    let options = Object::new();
    set_strings(&options, "types", PLACE_TYPES)?;
    set_strings(&options, "fields", PLACE_FIELDS)?;
    Ok(options)
}

fn set_strings(target: &Object, key: &str, values: &[&str]) -> anyhow::Result<()> {
    let array = values
        .iter()
        .map(|v| JsValue::from_str(v))
        .collect::<Array>();
    Reflect::set(target, &JsValue::from_str(key), &array).map_err(js_error)?;
    Ok(())
}

fn places_library_loaded() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    ["google", "maps", "places"]
        .iter()
        .try_fold(JsValue::from(window), |parent, key| {
            Reflect::get(&parent, &JsValue::from_str(key))
                .ok()
                .filter(JsValue::is_object)
        })
        .is_some()
}

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!(err
        .as_string()
        .unwrap_or_else(|| "unknown JS error".to_string()))
}
