use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use device_wizard::AddDeviceRequest;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    error::{ConsoleError, Result},
    metadata::HttpMetadataClient,
    registry::RegistryClient,
};

/// Shared state for every API handler
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub metadata: Arc<HttpMetadataClient>,
    pub registry: Arc<RegistryClient>,
    pub security_enabled: bool,
}

impl AppState {
    pub fn new(config: AppConfig, security_enabled: bool) -> Result<Self> {
        let metadata = Arc::new(HttpMetadataClient::new(&config.metadata)?);
        let registry = Arc::new(RegistryClient::new(&config.registry, &config.kong)?);

        Ok(Self {
            config,
            metadata,
            registry,
            security_enabled,
        })
    }

    /// Registry token for this request; only fetched in secure mode
    async fn registry_token(&self, headers: &HeaderMap) -> Result<Option<String>> {
        if !self.security_enabled {
            return Ok(None);
        }

        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = self.registry.acl_token(authorization).await?;
        Ok(Some(token))
    }
}

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/api/v2/ping", get(health_check))
        // Registry center
        .route("/api/v2/registrycenter/service/all", get(api_registered_services))
        .route("/api/v2/registrycenter/ping", get(api_registry_ping))
        // core-metadata
        .route(
            "/core-metadata/api/v2/deviceservice/all",
            get(api_get_device_services),
        )
        .route(
            "/core-metadata/api/v2/deviceprofile/all",
            get(api_get_device_profiles),
        )
        .route(
            "/core-metadata/api/v2/device/name/:name",
            get(api_get_device_by_name),
        )
        .route("/core-metadata/api/v2/device", post(api_add_device))
}

/// Health check endpoint
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "apiVersion": device_wizard::models::API_VERSION,
        "serviceName": "device-console",
        "coreMetadata": app_state.config.metadata.base_url,
        "securityEnabled": app_state.security_enabled,
        "timestamp": chrono::Utc::now()
    }))
}

/// List every service known to the registry
pub async fn api_registered_services(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let token = app_state.registry_token(&headers).await?;
    let endpoints = app_state.registry.service_endpoints(token.as_deref()).await?;
    Ok(Json(endpoints).into_response())
}

pub async fn api_registry_ping(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let token = app_state.registry_token(&headers).await?;
    if app_state.registry.is_alive(token.as_deref()).await {
        Ok(StatusCode::OK)
    } else {
        Err(ConsoleError::RegistryUnavailable)
    }
}

pub async fn api_get_device_services(State(app_state): State<AppState>) -> Result<Response> {
    let services = app_state.metadata.device_services().await?;
    Ok(Json(services).into_response())
}

pub async fn api_get_device_profiles(State(app_state): State<AppState>) -> Result<Response> {
    let profiles = app_state.metadata.device_profiles().await?;
    Ok(Json(profiles).into_response())
}

pub async fn api_get_device_by_name(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let device = app_state.metadata.device_by_name(&name).await?;
    Ok(Json(device).into_response())
}

/// Forward add-device requests; the answer carries one status per item
pub async fn api_add_device(
    State(app_state): State<AppState>,
    Json(requests): Json<Vec<AddDeviceRequest>>,
) -> Result<Response> {
    debug!("Forwarding {} add-device requests", requests.len());
    let results = app_state.metadata.add_devices(&requests).await?;

    let created = results.iter().filter(|result| result.is_success()).count();
    info!("core-metadata accepted {}/{} devices", created, results.len());

    Ok((StatusCode::MULTI_STATUS, Json(results)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app_for(upstream: &MockServer, security_enabled: bool) -> Router {
        let port = upstream.address().port();
        let mut config = AppConfig::default();
        config.metadata.base_url = upstream.uri();
        config.registry.host = "127.0.0.1".to_string();
        config.registry.port = port;
        config.kong.server = "127.0.0.1".to_string();
        config.kong.application_port = port;

        let state = AppState::new(config, security_enabled).unwrap();
        create_api_router().with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let upstream = MockServer::start().await;
        let app = app_for(&upstream, false).await;

        let response = app
            .oneshot(Request::get("/api/v2/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["apiVersion"], "v2");
        assert_eq!(body["coreMetadata"], upstream.uri());
        assert_eq!(body["securityEnabled"], false);
    }

    #[tokio::test]
    async fn test_add_device_returns_multi_status() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/device"))
            .respond_with(ResponseTemplate::new(207).set_body_json(serde_json::json!([
                {"apiVersion": "v2", "statusCode": 201, "id": "c0ffee"}
            ])))
            .expect(1)
            .mount(&upstream)
            .await;
        let app = app_for(&upstream, false).await;

        let payload = serde_json::json!([{
            "apiVersion": "v2",
            "device": {
                "name": "dev-A",
                "description": "",
                "adminState": "UNLOCKED",
                "operatingState": "UP",
                "serviceName": "device-virtual",
                "profileName": "Random-Integer-Device",
                "protocols": {"other": {}},
                "autoEvents": []
            }
        }]);
        let response = app
            .oneshot(
                Request::post("/core-metadata/api/v2/device")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        assert_eq!(body_json(response).await[0]["id"], "c0ffee");
    }

    #[tokio::test]
    async fn test_upstream_status_is_propagated() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/device/name/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_string("device not found"))
            .mount(&upstream)
            .await;
        let app = app_for(&upstream, false).await;

        let response = app
            .oneshot(
                Request::get("/core-metadata/api/v2/device/name/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("device not found"));
    }

    #[tokio::test]
    async fn test_registry_services_use_acl_token_in_secure_mode() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/consul/v1/acl/token/self"))
            .and(header_is("Authorization", "Bearer operator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"SecretID": "s-9"})))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/agent/services"))
            .and(header_is("X-Consul-Token", "s-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "core-metadata": {"ID": "core-metadata", "Service": "core-metadata", "Address": "edgex-core-metadata", "Port": 59881}
            })))
            .mount(&upstream)
            .await;
        let app = app_for(&upstream, true).await;

        let response = app
            .oneshot(
                Request::get("/api/v2/registrycenter/service/all")
                    .header(header::AUTHORIZATION, "Bearer operator")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await[0]["ServiceId"], "core-metadata");
    }

    #[tokio::test]
    async fn test_acl_failure_keeps_gateway_status() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/consul/v1/acl/token/self"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&upstream)
            .await;
        let app = app_for(&upstream, true).await;

        let response = app
            .oneshot(
                Request::get("/api/v2/registrycenter/service/all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "unable to get consul acl token");
    }

    #[tokio::test]
    async fn test_registry_ping_unavailable() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/status/leader"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;
        let app = app_for(&upstream, false).await;

        let response = app
            .oneshot(Request::get("/api/v2/registrycenter/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
