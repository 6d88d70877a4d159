use async_trait::async_trait;
use js_sys::{Promise, Reflect};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Geolocation, Position as GeolocationPosition};

use wasteinfo_boundary::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timeout")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl GeolocationError {
    /// Classifies the `code` of a `GeolocationPositionError`.
    #[must_use]
    pub fn from_code(code: u16, message: String) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Other(message),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_js(err: &JsValue) -> Self {
        let message = js_property(err, "message")
            .and_then(|m| m.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| "unknown JS error".to_string());
        match js_property(err, "code").and_then(|c| c.as_f64()) {
            Some(code) => Self::from_code(code as u16, message),
            None => Self::Other(message),
        }
    }
}

/// One-shot position fixes of the device.
#[async_trait(?Send)]
pub trait Geolocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// The geolocation capability of the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

#[async_trait(?Send)]
impl Geolocator for BrowserGeolocation {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        let geolocation = browser_geolocation().ok_or(GeolocationError::Unsupported)?;
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(err) =
                geolocation.get_current_position_with_error_callback(&resolve, Some(&reject))
            {
                _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        });
        let position = JsFuture::from(promise)
            .await
            .map_err(|err| GeolocationError::from_js(&err))?;
        let coords = position.unchecked_into::<GeolocationPosition>().coords();
        Ok(Coordinate {
            lat: coords.latitude(),
            lng: coords.longitude(),
        })
    }
}

fn browser_geolocation() -> Option<Geolocation> {
    let navigator = web_sys::window()?.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("geolocation")).unwrap_or(false) {
        return None;
    }
    navigator
        .geolocation()
        .ok()
        .filter(|geolocation| !geolocation.is_undefined())
}

fn js_property(value: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined())
}
