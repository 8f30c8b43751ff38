use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Version tag carried by every core-metadata v2 request envelope
pub const API_VERSION: &str = "v2";

/// Connection parameters for one protocol, keyed by property name
pub type ProtocolProperties = HashMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    Locked,
    #[default]
    Unlocked,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingState {
    #[default]
    Up,
    Down,
    Unknown,
}

impl AdminState {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminState::Locked => "LOCKED",
            AdminState::Unlocked => "UNLOCKED",
        }
    }
}

impl OperatingState {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingState::Up => "UP",
            OperatingState::Down => "DOWN",
            OperatingState::Unknown => "UNKNOWN",
        }
    }
}

/// Device service as returned by the service lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_address: String,
}

/// Device profile as returned by the profile lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
}

impl ServiceRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base_address: String::new(),
        }
    }
}

impl ProfileRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            manufacturer: String::new(),
            model: String::new(),
        }
    }
}

/// Auto event in its wire form, frequency is magnitude and unit in one string ("10ms")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoEvent {
    pub frequency: String,
    #[serde(default)]
    pub on_change: bool,
    pub source_name: String,
}

/// Device payload sent to core-metadata when the wizard completes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    pub service_name: String,
    pub profile_name: String,
    pub protocols: HashMap<String, ProtocolProperties>,
    #[serde(default)]
    pub auto_events: Vec<AutoEvent>,
}

/// Subset of an existing device needed to seed a new one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExistingDevice {
    pub name: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default)]
    pub auto_events: Vec<AutoEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddDeviceRequest {
    pub api_version: String,
    pub device: Device,
}

impl AddDeviceRequest {
    pub fn new(device: Device) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            device,
        }
    }
}

/// Per-item result of a core-metadata write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse {
    #[serde(default)]
    pub api_version: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl BaseResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MultiDeviceServicesResponse {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub services: Vec<ServiceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MultiDeviceProfilesResponse {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub profiles: Vec<ProfileRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceResponse {
    pub device: ExistingDevice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_wire_shape() {
        let device = Device {
            name: "dev-A".to_string(),
            description: String::new(),
            labels: None,
            admin_state: AdminState::default(),
            operating_state: OperatingState::default(),
            service_name: "svc-1".to_string(),
            profile_name: "profile-1".to_string(),
            protocols: HashMap::new(),
            auto_events: vec![AutoEvent {
                frequency: "10s".to_string(),
                on_change: false,
                source_name: "temp".to_string(),
            }],
        };

        let json = serde_json::to_value(AddDeviceRequest::new(device)).unwrap();
        assert_eq!(json["apiVersion"], "v2");
        assert_eq!(json["device"]["adminState"], "UNLOCKED");
        assert_eq!(json["device"]["operatingState"], "UP");
        assert_eq!(json["device"]["serviceName"], "svc-1");
        assert_eq!(json["device"]["autoEvents"][0]["sourceName"], "temp");
        assert_eq!(json["device"]["autoEvents"][0]["onChange"], false);
        assert!(json["device"].get("labels").is_none());
    }

    #[test]
    fn test_service_list_ignores_unknown_fields() {
        let body = r#"{
            "apiVersion": "v2",
            "statusCode": 200,
            "totalCount": 1,
            "services": [{
                "id": "5f1c",
                "name": "device-virtual",
                "baseAddress": "http://edgex-device-virtual:59900",
                "adminState": "UNLOCKED",
                "labels": []
            }]
        }"#;

        let response: MultiDeviceServicesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.total_count, 1);
        assert_eq!(response.services[0].name, "device-virtual");
        assert_eq!(response.services[0].description, "");
    }

    #[test]
    fn test_base_response_status() {
        let created: BaseResponse =
            serde_json::from_str(r#"{"apiVersion":"v2","statusCode":201,"id":"abc"}"#).unwrap();
        let conflict: BaseResponse =
            serde_json::from_str(r#"{"statusCode":409,"message":"name exists"}"#).unwrap();

        assert!(created.is_success());
        assert!(!conflict.is_success());
        assert_eq!(conflict.message.as_deref(), Some("name exists"));
    }
}
