//! Field type table: import type names and the internal types they resolve to.
//!
//! The table is fixed and total. Anything not listed is rejected by the validator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal field type used by the form renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Textarea,
    Number,
    Date,
    Time,
    Phone,
    File,
    Signature,
    Rating,
    Slider,
    Tags,
    Address,
    Link,
    Radio,
    Select,
    Checkbox,
    Statement,
    Poll,
    Scheduler,
    Social,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Phone => "phone",
            Self::File => "file",
            Self::Signature => "signature",
            Self::Rating => "rating",
            Self::Slider => "slider",
            Self::Tags => "tags",
            Self::Address => "address",
            Self::Link => "link",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Statement => "statement",
            Self::Poll => "poll",
            Self::Scheduler => "scheduler",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Import type name → internal type. Order is the order reported to users.
pub const SUPPORTED_FIELD_TYPES: &[(&str, FieldType)] = &[
    ("text", FieldType::Text),
    ("short_text", FieldType::Text),
    ("email", FieldType::Email),
    ("textarea", FieldType::Textarea),
    ("long_text", FieldType::Textarea),
    ("number", FieldType::Number),
    ("date", FieldType::Date),
    ("time", FieldType::Time),
    ("phone", FieldType::Phone),
    ("file", FieldType::File),
    ("signature", FieldType::Signature),
    ("rating", FieldType::Rating),
    ("slider", FieldType::Slider),
    ("tags", FieldType::Tags),
    ("address", FieldType::Address),
    ("link", FieldType::Link),
    ("radio", FieldType::Radio),
    ("select", FieldType::Select),
    ("checkbox", FieldType::Checkbox),
    ("checkboxes", FieldType::Checkbox),
    ("multi_select", FieldType::Select),
    ("section", FieldType::Statement),
    ("statement", FieldType::Statement),
    ("poll", FieldType::Poll),
    ("scheduler", FieldType::Scheduler),
    ("social", FieldType::Social),
];

/// Import types that must carry a non-empty `options` array.
pub const OPTION_TYPES: &[&str] = &["radio", "select", "checkbox", "checkboxes", "multi_select"];

/// Import types that accept `minSelections` / `maxSelections`.
pub const SELECTION_TYPES: &[&str] = &["checkboxes", "multi_select"];

/// Import types that accept `min` / `max` / `step`.
pub const NUMERIC_TYPES: &[&str] = &["number", "slider"];

/// Import types whose label is optional (a blank label only warns).
pub const STATEMENT_TYPES: &[&str] = &["section", "statement"];

/// Resolve an import type name. Matching is exact (case-sensitive).
pub fn resolve_field_type(import_type: &str) -> Option<FieldType> {
    SUPPORTED_FIELD_TYPES
        .iter()
        .find(|(name, _)| *name == import_type)
        .map(|(_, field_type)| *field_type)
}

/// Comma-separated list of every accepted import type name.
pub fn supported_type_list() -> String {
    SUPPORTED_FIELD_TYPES
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}
