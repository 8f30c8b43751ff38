use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::{KongConfig, RegistryConfig};
use crate::error::{ConsoleError, Result};

/// Gateway route returning the caller's consul ACL token
pub const ACL_OF_CONSUL_PATH: &str = "/consul/v1/acl/token/self";
pub const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

/// A service registered with the registry, as served to the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEndpoint {
    pub service_id: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AgentService {
    service: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AclToken {
    #[serde(rename = "SecretID")]
    secret_id: String,
}

/// Consul client used by the registry-center endpoints
pub struct RegistryClient {
    client: Client,
    registry_url: Url,
    kong_url: Url,
}

impl RegistryClient {
    pub fn new(registry: &RegistryConfig, kong: &KongConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            registry_url: Url::parse(&format!("http://{}:{}/", registry.host, registry.port))?,
            kong_url: Url::parse(&format!("http://{}:{}/", kong.server, kong.application_port))?,
        })
    }

    /// Fetch the consul ACL token through the gateway on behalf of the caller
    pub async fn acl_token(&self, authorization: Option<&str>) -> Result<String> {
        let url = self.kong_url.join(ACL_OF_CONSUL_PATH)?;
        let mut request = self.client.get(url);
        if let Some(authorization) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = request.send().await.map_err(|e| {
            warn!("ACL token request failed: {}", e);
            ConsoleError::AclToken {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ConsoleError::AclToken { status: status.as_u16() });
        }

        let acl: AclToken = response.json().await.map_err(|_| ConsoleError::AclToken {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        })?;
        Ok(acl.secret_id)
    }

    fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::RequestBuilder> {
        let url = self.registry_url.join(path)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(CONSUL_TOKEN_HEADER, token);
        }
        Ok(request)
    }

    /// All services registered with the local agent, ordered by service id
    pub async fn service_endpoints(&self, token: Option<&str>) -> Result<Vec<ServiceEndpoint>> {
        let response = self.get("v1/agent/services", token)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConsoleError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let services: HashMap<String, AgentService> = response.json().await?;
        let mut endpoints: Vec<ServiceEndpoint> = services
            .into_values()
            .map(|service| ServiceEndpoint {
                service_id: service.service,
                host: service.address,
                port: service.port,
            })
            .collect();
        endpoints.sort_by(|a, b| a.service_id.cmp(&b.service_id));

        debug!("Registry lists {} services", endpoints.len());
        Ok(endpoints)
    }

    /// The registry is alive when it can name a leader
    pub async fn is_alive(&self, token: Option<&str>) -> bool {
        let request = match self.get("v1/status/leader", token) {
            Ok(request) => request,
            Err(_) => return false,
        };

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Registry health check failed: {}", e);
                false
            }
        }
    }
}
