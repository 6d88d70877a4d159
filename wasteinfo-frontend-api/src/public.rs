use async_trait::async_trait;
use gloo_net::http::Request;

use wasteinfo_boundary::{WasteInfoRequest, WasteInfoResponse};

use crate::{into_json, Result, WasteInfoApi};

/// Public waste info API
#[derive(Debug, Clone)]
pub struct PublicApi {
    url: String,
}

impl PublicApi {
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url }
    }

    pub async fn waste_info(&self, location: &str) -> Result<WasteInfoResponse> {
        let url = format!("{}/waste-info", self.url);
        let request = WasteInfoRequest {
            location: location.to_owned(),
        };
        let response = Request::post(&url).json(&request)?.send().await?;
        into_json(response).await
    }
}

#[async_trait(?Send)]
impl WasteInfoApi for PublicApi {
    async fn waste_info(&self, location: &str) -> Result<WasteInfoResponse> {
        PublicApi::waste_info(self, location).await
    }
}
