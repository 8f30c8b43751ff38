use async_trait::async_trait;
use device_wizard::{
    AddDeviceRequest, BaseResponse, Device, DeviceCreator, DeviceResponse, MultiDeviceProfilesResponse,
    MultiDeviceServicesResponse, WizardError,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::MetadataConfig;
use crate::error::{ConsoleError, Result};

/// Header core services use to tie log lines of one request together
pub const CORRELATION_HEADER: &str = "X-Correlation-ID";

/// Client for the core-metadata v2 REST API
pub struct HttpMetadataClient {
    client: Client,
    base_url: Url,
}

impl HttpMetadataClient {
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // a trailing slash keeps any base path when joining endpoints
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let correlation_id = Uuid::new_v4().to_string();
        debug!("{} {} ({})", method, url, correlation_id);

        Ok(self
            .client
            .request(method, url)
            .header(CORRELATION_HEADER, correlation_id))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConsoleError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Send add-device requests; core-metadata answers with one result per item
    pub async fn add_devices(&self, requests: &[AddDeviceRequest]) -> Result<Vec<BaseResponse>> {
        let response = self
            .request(Method::POST, "api/v2/device")?
            .json(requests)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn device_services(&self) -> Result<MultiDeviceServicesResponse> {
        let response = self
            .request(Method::GET, "api/v2/deviceservice/all?offset=0&limit=-1")?
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn device_profiles(&self) -> Result<MultiDeviceProfilesResponse> {
        let response = self
            .request(Method::GET, "api/v2/deviceprofile/all?offset=0&limit=-1")?
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn device_by_name(&self, name: &str) -> Result<DeviceResponse> {
        let path = format!("api/v2/device/name/{}", urlencoding::encode(name));
        let response = self.request(Method::GET, &path)?.send().await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl DeviceCreator for HttpMetadataClient {
    async fn add_device(&self, device: Device) -> device_wizard::Result<String> {
        let name = device.name.clone();
        let responses = self.add_devices(&[AddDeviceRequest::new(device)]).await?;

        let Some(result) = responses.into_iter().next() else {
            return Err(WizardError::Creation("Empty response from core-metadata".to_string()));
        };

        if !result.is_success() {
            warn!("core-metadata rejected device '{}' with {}", name, result.status_code);
            return Err(WizardError::Creation(format!(
                "{}: {}",
                result.status_code,
                result.message.unwrap_or_default()
            )));
        }

        let id = result.id.unwrap_or_default();
        info!("core-metadata created device '{}' ({})", name, id);
        Ok(id)
    }
}
