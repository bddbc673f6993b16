//! Dispatcher configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_part_attribute() -> String {
    "data-part".to_string()
}

fn default_root_part() -> String {
    "root".to_string()
}

fn default_run_before() -> String {
    "bind".to_string()
}

fn default_data_directive() -> String {
    "data".to_string()
}

fn default_id_directive() -> String {
    "id".to_string()
}

/// Attribute and directive names the dispatcher emits.
///
/// Every field is optional in serialized form; missing fields take their
/// defaults.
///
/// ```
/// use part_dispatch_core::DispatchConfig;
///
/// let config = DispatchConfig::from_json_str(r#"{ "part_attribute": "data-slot" }"#).unwrap();
/// assert_eq!(config.part_attribute, "data-slot");
/// assert_eq!(config.root_part, "root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Marker attribute recording the raw part name on part elements.
    #[serde(default = "default_part_attribute")]
    pub part_attribute: String,
    /// Part key invoked on the root element.
    #[serde(default = "default_root_part")]
    pub root_part: String,
    /// Host directive the component directive must run before.
    #[serde(default = "default_run_before")]
    pub run_before: String,
    /// Unprefixed name of the host's data directive.
    #[serde(default = "default_data_directive")]
    pub data_directive: String,
    /// Unprefixed name of the host's id-scope directive.
    #[serde(default = "default_id_directive")]
    pub id_directive: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            part_attribute: default_part_attribute(),
            root_part: default_root_part(),
            run_before: default_run_before(),
            data_directive: default_data_directive(),
            id_directive: default_id_directive(),
        }
    }
}

impl DispatchConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay the fields present in `user` onto `defaults`.
    pub fn merge(mut defaults: Self, user: ConfigOverrides) -> Self {
        let ConfigOverrides {
            part_attribute,
            root_part,
            run_before,
            data_directive,
            id_directive,
        } = user;

        if let Some(value) = part_attribute {
            defaults.part_attribute = value;
        }
        if let Some(value) = root_part {
            defaults.root_part = value;
        }
        if let Some(value) = run_before {
            defaults.run_before = value;
        }
        if let Some(value) = data_directive {
            defaults.data_directive = value;
        }
        if let Some(value) = id_directive {
            defaults.id_directive = value;
        }
        defaults
    }

    /// Parse a user JSON document and overlay it onto `defaults`.
    pub fn merge_json_str(defaults: Self, json: &str) -> Result<Self> {
        Ok(Self::merge(defaults, ConfigOverrides::from_json_str(json)?))
    }
}

/// User-supplied subset of a [`DispatchConfig`].
///
/// Only fields present in the document are set, so a value equal to the
/// built-in default still overrides a customised base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_directive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_directive: Option<String>,
}

impl ConfigOverrides {
    /// Parse a partial JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.part_attribute, "data-part");
        assert_eq!(config.root_part, "root");
        assert_eq!(config.run_before, "bind");
        assert_eq!(config.data_directive, "data");
        assert_eq!(config.id_directive, "id");
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = DispatchConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn test_invalid_document() {
        let err = DispatchConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_merge_user_overrides() {
        let mut defaults = DispatchConfig::default();
        defaults.root_part = "host".to_string();

        let user = ConfigOverrides::from_json_str(r#"{ "part_attribute": "data-slot" }"#).unwrap();
        let merged = DispatchConfig::merge(defaults, user);

        assert_eq!(merged.part_attribute, "data-slot");
        assert_eq!(merged.root_part, "host");
        assert_eq!(merged.run_before, "bind");
    }

    #[test]
    fn test_merge_user_value_equal_to_builtin_default() {
        let mut defaults = DispatchConfig::default();
        defaults.root_part = "host".to_string();
        defaults.run_before = "init".to_string();

        let merged = DispatchConfig::merge_json_str(defaults, r#"{ "root_part": "root" }"#).unwrap();

        assert_eq!(merged.root_part, "root");
        assert_eq!(merged.run_before, "init");
    }

    #[test]
    fn test_merge_empty_overrides_keeps_defaults() {
        let mut defaults = DispatchConfig::default();
        defaults.part_attribute = "data-slot".to_string();

        let merged = DispatchConfig::merge(defaults.clone(), ConfigOverrides::default());
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_merge_invalid_user_document() {
        let err = DispatchConfig::merge_json_str(DispatchConfig::default(), "[1, 2]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(DispatchConfig::default()).unwrap();
        assert_eq!(json["part_attribute"], "data-part");
        assert_eq!(json["run_before"], "bind");
    }
}
