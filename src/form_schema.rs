//! Internal form schema types.
//!
//! This is the strict representation the rest of the application renders and
//! persists. Field settings are a closed per-type payload so that settings which
//! make no sense for a field type cannot be expressed.

use crate::field_types::FieldType;
use serde::Serialize;
use serde_json::Value;

/// Primary color used for every theme except `dark`.
pub const LIGHT_PRIMARY_COLOR: &str = "#3b82f6";
/// Primary color used when the import asks for the `dark` theme.
pub const DARK_PRIMARY_COLOR: &str = "#1f2937";
pub const DEFAULT_SUBMIT_TEXT: &str = "Submit";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Thank you for your submission!";
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Root internal schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub blocks: Vec<FormBlock>,
    /// Flat copy of every block's fields, in block order.
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
    pub logic: FormLogic,
}

/// A group of fields rendered together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBlock {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub settings: BlockSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    pub show_step_number: bool,
    pub layout: BlockLayout,
    pub spacing: BlockSpacing,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            show_step_number: false,
            layout: BlockLayout::Single,
            spacing: BlockSpacing::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockLayout {
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSpacing {
    Normal,
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub settings: FieldSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_message: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Settings shared by every field type plus the type-specific payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(flatten)]
    pub kind: TypeSettings,
}

/// Type-specific settings. Serialized flat into the field's settings object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeSettings {
    Textarea {
        #[serde(skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
    },
    Numeric {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Checkbox {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Select {
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        allow_multiple: bool,
    },
    #[serde(rename_all = "camelCase")]
    Statement {
        statement_heading: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        statement_description: Option<String>,
        statement_align: StatementAlign,
        statement_size: StatementSize,
    },
    #[serde(rename_all = "camelCase")]
    Rating {
        star_count: u8,
        icon: String,
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Tags {
        max_tags: u32,
        allow_duplicates: bool,
    },
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementAlign {
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementSize {
    Md,
}

/// Form-level settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    pub title: String,
    pub description: String,
    pub submit_text: String,
    pub success_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub primary_color: String,
    pub single_step: bool,
    pub show_progress: bool,
    pub rtl: bool,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Conditional logic. Imports never carry rules, so this only passes through.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLogic {
    pub rules: Vec<Value>,
}

/// Build an empty schema with default settings.
pub fn create_default_schema(title: &str, description: &str) -> FormSchema {
    FormSchema {
        blocks: Vec::new(),
        fields: Vec::new(),
        settings: FormSettings {
            title: title.to_string(),
            description: description.to_string(),
            submit_text: DEFAULT_SUBMIT_TEXT.to_string(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            redirect_url: None,
            primary_color: LIGHT_PRIMARY_COLOR.to_string(),
            single_step: true,
            show_progress: false,
            rtl: false,
            notifications: NotificationSettings::default(),
        },
        logic: FormLogic::default(),
    }
}
