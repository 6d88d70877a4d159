use async_trait::async_trait;
use gloo_net::http::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;

use wasteinfo_boundary::WasteInfoResponse;

mod public;

pub use self::public::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Fetch(String),
}

impl From<gloo_net::Error> for Error {
    fn from(err: gloo_net::Error) -> Self {
        Self::Fetch(format!("{err}"))
    }
}

/// Answers waste info queries for a location.
#[async_trait(?Send)]
pub trait WasteInfoApi {
    async fn waste_info(&self, location: &str) -> Result<WasteInfoResponse>;
}

pub async fn into_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    // The backend reports its failures in the JSON body,
    // so the status code is not taken into account.
    if !response.ok() {
        log::debug!(
            "{} responded with HTTP status {}",
            response.url(),
            response.status()
        );
    }
    Ok(response.json().await?)
}
