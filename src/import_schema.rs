//! External form import shape.
//!
//! These types describe the JSON a user uploads. Known keys are typed, anything
//! else lands in the `extra` side-map and is carried but ignored. Deserializing
//! into these types is only attempted after [`crate::validator::SchemaValidator`]
//! accepted the document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Root of an imported form document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFormSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ImportedSettings>,
    pub fields: Vec<ImportedFormField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One field entry of an import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFormField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Import type name, kept as written so `multi_select` stays distinguishable
    /// from `select` after resolution.
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Type-specific keys below are only checked for the types that use them,
    /// so values of the wrong shape decode as absent.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ImportedOption>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<f64>,
    /// Not checked by the validator, so kept loosely typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_checked: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ImportedValidation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An option is either a bare label or an `{id, label}` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportedOption {
    Label(String),
    Choice {
        #[serde(default)]
        id: Option<String>,
        label: String,
    },
    Other(Value),
}

impl ImportedOption {
    /// Label used by the internal schema; malformed entries fall back to `"Option"`.
    pub fn normalized_label(&self) -> String {
        match self {
            Self::Label(label) => label.clone(),
            Self::Choice { label, .. } => label.clone(),
            Self::Other(_) => "Option".to_string(),
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Form-level settings. Free-form; only the listed keys are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<ImportedSubmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<ImportedNotifications>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedNotifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_preserved() {
        let field: ImportedFormField = serde_json::from_value(json!({
            "id": "f1",
            "type": "text",
            "label": "Name",
            "color": "red",
            "x-origin": {"tool": "sheets"}
        }))
        .unwrap();

        assert_eq!(field.field_type, "text");
        assert_eq!(field.extra.get("color"), Some(&json!("red")));
        assert!(field.extra.contains_key("x-origin"));
    }

    #[test]
    fn test_option_shapes() {
        let options: Vec<ImportedOption> =
            serde_json::from_value(json!(["A", {"id": "x", "label": "C"}, 42])).unwrap();

        let labels: Vec<String> = options.iter().map(|o| o.normalized_label()).collect();
        assert_eq!(labels, vec!["A", "C", "Option"]);
    }

    #[test]
    fn test_camel_case_keys() {
        let field: ImportedFormField = serde_json::from_value(json!({
            "id": "f1",
            "type": "checkboxes",
            "label": "Pick",
            "helpText": "Choose wisely",
            "minSelections": 1,
            "maxSelections": 3,
            "defaultChecked": true
        }))
        .unwrap();

        assert_eq!(field.help_text.as_deref(), Some("Choose wisely"));
        assert_eq!(field.min_selections, Some(1.0));
        assert_eq!(field.max_selections, Some(3.0));
        assert_eq!(field.default_checked, Some(json!(true)));
    }

    #[test]
    fn test_unchecked_keys_decode_leniently() {
        let field: ImportedFormField = serde_json::from_value(json!({
            "id": "f1",
            "type": "text",
            "label": "Name",
            "options": "none",
            "min": "low",
            "maxSelections": [1]
        }))
        .unwrap();

        assert!(field.options.is_none());
        assert!(field.min.is_none());
        assert!(field.max_selections.is_none());
    }

    #[test]
    fn test_settings_sub_objects() {
        let settings: ImportedSettings = serde_json::from_value(json!({
            "theme": "dark",
            "submission": {"redirectUrl": null, "successMessage": "Thanks"},
            "notifications": {"sendEmail": true, "emails": ["a@b.co"]},
            "customKey": 1
        }))
        .unwrap();

        let submission = settings.submission.unwrap();
        assert_eq!(submission.redirect_url, None);
        assert_eq!(submission.success_message.as_deref(), Some("Thanks"));
        assert_eq!(settings.notifications.unwrap().emails.unwrap(), vec!["a@b.co"]);
        assert!(settings.extra.contains_key("customKey"));
    }
}
