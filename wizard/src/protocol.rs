use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::models::ProtocolProperties;

/// Predefined connection parameter sets offered by the wizard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    Mqtt,
    ModbusTcp,
    ModbusRtu,
}

const MQTT_FIELDS: &[&str] = &["Schema", "Host", "Port", "User", "Password", "ClientId", "Topic"];
const MODBUS_TCP_FIELDS: &[&str] = &["Address", "Port", "UnitID"];
// Parity: N - None, O - Odd, E - Even
const MODBUS_RTU_FIELDS: &[&str] = &["Address", "UnitID", "BaudRate", "DataBits", "StopBits", "Parity"];

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Mqtt, TemplateKind::ModbusTcp, TemplateKind::ModbusRtu];

    /// Protocol name used as the key in the device's protocol map
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Mqtt => "mqtt",
            TemplateKind::ModbusTcp => "modbus-tcp",
            TemplateKind::ModbusRtu => "modbus-rtu",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateKind::Mqtt => "MQTT",
            TemplateKind::ModbusTcp => "Modbus TCP",
            TemplateKind::ModbusRtu => "Modbus RTU",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Ordered field names rendered as inputs for this template
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            TemplateKind::Mqtt => MQTT_FIELDS,
            TemplateKind::ModbusTcp => MODBUS_TCP_FIELDS,
            TemplateKind::ModbusRtu => MODBUS_RTU_FIELDS,
        }
    }
}

/// A template instance: the kind plus one value per field, in field order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolTemplate {
    kind: Option<TemplateKind>,
    values: Vec<(&'static str, String)>,
}

impl ProtocolTemplate {
    /// Fallback template with no fields
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(kind: TemplateKind) -> Self {
        Self {
            kind: Some(kind),
            values: kind.field_names().iter().map(|name| (*name, String::new())).collect(),
        }
    }

    /// Never fails: unknown names give the empty template
    pub fn for_name(name: &str) -> Self {
        TemplateKind::from_name(name).map(Self::new).unwrap_or_default()
    }

    pub fn kind(&self) -> Option<TemplateKind> {
        self.kind
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.values.iter().map(|(name, _)| *name).collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Returns false if the template has no such field
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn to_properties(&self) -> ProtocolProperties {
        self.values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    #[default]
    Template,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProperty {
    pub id: u64,
    pub key: String,
    pub value: String,
}

/// Protocol step state: either a template selection or a free-form property list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    mode: ProtocolMode,
    name: String,
    template: ProtocolTemplate,
    custom: Vec<CustomProperty>,
    next_id: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        let mut config = Self {
            mode: ProtocolMode::default(),
            name: String::new(),
            template: ProtocolTemplate::empty(),
            custom: Vec::new(),
            next_id: 0,
        };
        config.reset_custom_properties();
        config
    }
}

impl ProtocolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ProtocolMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &ProtocolTemplate {
        &self.template
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.template.field_names()
    }

    pub fn custom_properties(&self) -> &[CustomProperty] {
        &self.custom
    }

    /// Replace the active template with a fresh instance of `kind`.
    pub fn select_template(&mut self, kind: &str) {
        self.name = kind.to_string();
        self.template = ProtocolTemplate::for_name(kind);
        debug!(
            "Selected protocol template '{}' with {} fields",
            kind,
            self.template.field_names().len()
        );
    }

    /// Switch between template and custom entry, dropping whatever was entered.
    pub fn switch_model(&mut self, mode: ProtocolMode) {
        self.name.clear();
        self.template = ProtocolTemplate::empty();
        self.reset_custom_properties();
        self.mode = mode;
    }

    /// Protocol name typed by the operator in custom mode
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_template_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        self.template.set(field, value)
    }

    pub fn add_custom_property(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.custom.push(CustomProperty {
            id,
            key: String::new(),
            value: String::new(),
        });
        id
    }

    /// Unknown ids are ignored
    pub fn remove_custom_property(&mut self, id: u64) -> bool {
        match self.custom.iter().position(|property| property.id == id) {
            Some(index) => {
                self.custom.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_custom_key(&mut self, id: u64, key: impl Into<String>) {
        if let Some(property) = self.custom.iter_mut().find(|property| property.id == id) {
            property.key = key.into();
        }
    }

    pub fn set_custom_value(&mut self, id: u64, value: impl Into<String>) {
        if let Some(property) = self.custom.iter_mut().find(|property| property.id == id) {
            property.value = value.into();
        }
    }

    pub fn reset_custom_properties(&mut self) {
        self.custom.clear();
        self.add_custom_property();
    }

    /// Protocol map for the device payload. Duplicate custom keys: last one wins.
    pub fn to_protocols(&self) -> HashMap<String, ProtocolProperties> {
        let properties = match self.mode {
            ProtocolMode::Custom => self
                .custom
                .iter()
                .map(|property| (property.key.clone(), property.value.clone()))
                .collect(),
            ProtocolMode::Template => self.template.to_properties(),
        };

        HashMap::from([(self.name.clone(), properties)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_mqtt_template() {
        let mut config = ProtocolConfig::new();
        config.select_template("mqtt");

        assert_eq!(config.name(), "mqtt");
        assert_eq!(config.template().kind(), Some(TemplateKind::Mqtt));
        assert_eq!(
            config.field_names(),
            vec!["Schema", "Host", "Port", "User", "Password", "ClientId", "Topic"]
        );
        assert!(config.template().fields().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn test_select_unknown_template_is_empty() {
        let mut config = ProtocolConfig::new();
        config.select_template("mqtt");
        config.select_template("unknown-x");

        assert_eq!(config.name(), "unknown-x");
        assert_eq!(config.template().kind(), None);
        assert!(config.field_names().is_empty());
        assert_eq!(config.to_protocols()["unknown-x"], ProtocolProperties::new());
    }

    #[test]
    fn test_reselecting_template_resets_values() {
        let mut config = ProtocolConfig::new();
        config.select_template("modbus-tcp");
        assert!(config.set_template_field("Address", "10.0.0.5"));
        assert!(!config.set_template_field("Topic", "ignored"));

        config.select_template("modbus-rtu");
        assert_eq!(
            config.field_names(),
            vec!["Address", "UnitID", "BaudRate", "DataBits", "StopBits", "Parity"]
        );
        assert_eq!(config.template().get("Address"), Some(""));
    }

    #[test]
    fn test_switch_model_discards_entries() {
        let mut config = ProtocolConfig::new();
        config.select_template("mqtt");
        config.set_template_field("Host", "broker");
        let id = config.add_custom_property();
        config.set_custom_key(id, "k");

        config.switch_model(ProtocolMode::Custom);

        assert_eq!(config.mode(), ProtocolMode::Custom);
        assert_eq!(config.name(), "");
        assert!(config.field_names().is_empty());
        assert_eq!(config.custom_properties().len(), 1);
        assert_eq!(config.custom_properties()[0].key, "");
        assert_eq!(config.custom_properties()[0].value, "");
    }

    #[test]
    fn test_reset_custom_properties_leaves_one_empty_row() {
        let mut config = ProtocolConfig::new();
        config.add_custom_property();
        config.add_custom_property();

        config.reset_custom_properties();

        let properties = config.custom_properties();
        assert_eq!(properties.len(), 1);
        assert_eq!((properties[0].key.as_str(), properties[0].value.as_str()), ("", ""));
    }

    #[test]
    fn test_remove_custom_property_by_id() {
        let mut config = ProtocolConfig::new();
        let first = config.custom_properties()[0].id;
        let second = config.add_custom_property();
        // structurally equal rows stay distinguishable
        assert_eq!(config.custom_properties()[0].key, config.custom_properties()[1].key);

        assert!(config.remove_custom_property(second));
        assert_eq!(config.custom_properties().len(), 1);
        assert_eq!(config.custom_properties()[0].id, first);

        assert!(!config.remove_custom_property(999));
        assert_eq!(config.custom_properties().len(), 1);
    }

    #[test]
    fn test_custom_duplicate_keys_last_wins() {
        let mut config = ProtocolConfig::new();
        config.switch_model(ProtocolMode::Custom);
        config.set_name("opc-ua");
        let first = config.custom_properties()[0].id;
        config.set_custom_key(first, "a");
        config.set_custom_value(first, "1");
        let second = config.add_custom_property();
        config.set_custom_key(second, "a");
        config.set_custom_value(second, "2");

        let protocols = config.to_protocols();
        assert_eq!(protocols.len(), 1);
        assert_eq!(protocols["opc-ua"].len(), 1);
        assert_eq!(protocols["opc-ua"]["a"], "2");
    }

    #[test]
    fn test_template_kind_names() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TemplateKind::from_name("MQTT"), None);
    }
}
