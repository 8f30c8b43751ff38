use async_trait::async_trait;
use device_wizard::{
    AddDeviceRequest, BaseResponse, Device, DeviceCreator, DeviceResponse, ExistingDevice,
    MultiDeviceProfilesResponse, MultiDeviceServicesResponse, ProfileRef, ServiceRef, WizardError,
};
use gloo_utils::format::JsValueSerdeExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const METADATA_PREFIX: &str = "/core-metadata/api/v2";

/// Browser client for the console's core-metadata routes
#[derive(Clone, Copy, Default)]
pub struct ApiClient;

impl ApiClient {
    /// Every device service known to core-metadata
    pub async fn get_device_services() -> Result<Vec<ServiceRef>, String> {
        let url = format!("{}/deviceservice/all", METADATA_PREFIX);
        let response: MultiDeviceServicesResponse = Self::fetch(&url, "GET", None::<()>).await?;
        Ok(response.services)
    }

    /// Every device profile known to core-metadata
    pub async fn get_device_profiles() -> Result<Vec<ProfileRef>, String> {
        let url = format!("{}/deviceprofile/all", METADATA_PREFIX);
        let response: MultiDeviceProfilesResponse = Self::fetch(&url, "GET", None::<()>).await?;
        Ok(response.profiles)
    }

    /// Look up an existing device, used to preload its auto events
    pub async fn get_device(name: &str) -> Result<ExistingDevice, String> {
        let url = format!("{}/device/name/{}", METADATA_PREFIX, urlencoding::encode(name));
        let response: DeviceResponse = Self::fetch(&url, "GET", None::<()>).await?;
        Ok(response.device)
    }

    pub async fn add_devices(requests: &[AddDeviceRequest]) -> Result<Vec<BaseResponse>, String> {
        let url = format!("{}/device", METADATA_PREFIX);
        Self::fetch(&url, "POST", Some(requests)).await
    }

    /// Generic fetch function
    async fn fetch<T: Serialize, R: DeserializeOwned>(
        url: &str,
        method: &str,
        body: Option<T>,
    ) -> Result<R, String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        if let Some(body_data) = body {
            let body_str = serde_json::to_string(&body_data)
                .map_err(|e| format!("Failed to serialize request: {}", e))?;
            opts.set_body(&JsValue::from_str(&body_str));
        }

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|_| "Failed to create request".to_string())?;

        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|_| "Failed to set content type".to_string())?;

        let window = web_sys::window().ok_or("No window available")?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|_| "Request failed".to_string())?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| "Failed to cast response".to_string())?;

        if !resp.ok() {
            return Err(format!("Request failed with status: {}", resp.status()));
        }

        let json = JsFuture::from(resp.json().map_err(|_| "Failed to get JSON from response")?)
            .await
            .map_err(|_| "Failed to parse response JSON".to_string())?;

        json.into_serde()
            .map_err(|e| format!("Failed to parse response: {}", e))
    }
}

#[async_trait(?Send)]
impl DeviceCreator for ApiClient {
    async fn add_device(&self, device: Device) -> device_wizard::Result<String> {
        let results = Self::add_devices(&[AddDeviceRequest::new(device)])
            .await
            .map_err(WizardError::Creation)?;

        let result = results
            .into_iter()
            .next()
            .ok_or_else(|| WizardError::Creation("Empty response from core-metadata".to_string()))?;

        if !result.is_success() {
            return Err(WizardError::Creation(
                result
                    .message
                    .unwrap_or_else(|| format!("Request failed with status: {}", result.status_code)),
            ));
        }

        Ok(result.id.unwrap_or_default())
    }
}
