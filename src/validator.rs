//! Structural validation of an import document.
//!
//! Walks an untyped `serde_json::Value` top-down and collects every defect it
//! finds with a path such as `fields[2].options[0].label`. Nothing here fails:
//! unparsable input is reported as a single `root` error.

use crate::error::ImportError;
use crate::field_types::{
    resolve_field_type, supported_type_list, NUMERIC_TYPES, OPTION_TYPES, SELECTION_TYPES,
    STATEMENT_TYPES,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Message fragments that mark an error as easily fixable by the user
/// (a value of the wrong primitive type). Advisory only.
pub const FIXABLE_ERROR_PATTERNS: &[&str] = &["must be a boolean", "must be a string"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic, addressed by its location in the input document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn is_fixable(&self) -> bool {
        FIXABLE_ERROR_PATTERNS
            .iter()
            .any(|pattern| self.message.contains(pattern))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub fixable_errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_diagnostics(errors: Vec<ValidationError>, warnings: Vec<ValidationError>) -> Self {
        let fixable_errors = errors.iter().filter(|e| e.is_fixable()).cloned().collect();
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            fixable_errors,
        }
    }

    pub(crate) fn parse_failure(message: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationError {
                path: "root".to_string(),
                message,
                severity: Severity::Error,
            }],
            warnings: Vec::new(),
            fixable_errors: Vec::new(),
        }
    }
}

/// Validator for the form import shape. Stateless; every call uses its own
/// accumulators.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parse `text` as JSON, then validate it.
    pub fn validate_str(&self, text: &str) -> ValidationResult {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.validate_document(&value),
            Err(e) => {
                debug!("Import is not valid JSON: {}", e);
                ValidationResult::parse_failure(ImportError::Parse(e).to_string())
            }
        }
    }

    /// Validate a JSON value. A JSON string is treated as raw document text.
    pub fn validate(&self, input: &Value) -> ValidationResult {
        match input {
            Value::String(text) => self.validate_str(text),
            other => self.validate_document(other),
        }
    }

    fn validate_document(&self, value: &Value) -> ValidationResult {
        let mut run = ValidationRun::default();
        run.check_root(value);

        debug!(
            "Validation finished: {} errors, {} warnings",
            run.errors.len(),
            run.warnings.len()
        );
        ValidationResult::from_diagnostics(run.errors, run.warnings)
    }
}

/// Accumulators for one validation pass. Append-only.
#[derive(Default)]
struct ValidationRun {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationRun {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationError {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }

    fn check_root(&mut self, value: &Value) {
        let Some(root) = value.as_object() else {
            self.error("root", "Import must be a JSON object");
            return;
        };

        if !is_non_empty_string(root.get("title")) {
            self.error("title", "Form title is required and must be a non-empty string");
        }
        self.check_optional_string(root, "description", "description", "Form description");

        match root.get("fields") {
            Some(Value::Array(fields)) => {
                if fields.is_empty() {
                    self.error("fields", "Form must have at least one field");
                }
                let mut seen_ids = HashSet::new();
                for (index, field) in fields.iter().enumerate() {
                    self.check_field(index, field, &mut seen_ids);
                }
            }
            _ => {
                self.error("fields", "Form must have a fields array");
                return;
            }
        }

        if let Some(settings) = root.get("settings") {
            self.check_settings(settings);
        }
    }

    fn check_field<'a>(&mut self, index: usize, value: &'a Value, seen_ids: &mut HashSet<&'a str>) {
        let base = format!("fields[{}]", index);
        let Some(field) = value.as_object() else {
            self.error(base, "Field must be an object");
            return;
        };
        let path = |key: &str| format!("{}.{}", base, key);

        match field.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => {
                if !seen_ids.insert(id) {
                    self.warning(
                        path("id"),
                        format!("Duplicate field ID \"{}\"; a new ID will be generated", id),
                    );
                }
            }
            _ => self.error(path("id"), "Field ID is required and must be a non-empty string"),
        }

        let field_type = match field.get("type").and_then(Value::as_str) {
            Some(t) if !t.trim().is_empty() => {
                if resolve_field_type(t).is_none() {
                    self.error(
                        path("type"),
                        format!(
                            "Unsupported field type \"{}\". Supported types: {}",
                            t,
                            supported_type_list()
                        ),
                    );
                }
                Some(t)
            }
            _ => {
                self.error(path("type"), "Field type is required and must be a non-empty string");
                None
            }
        };

        if !is_non_empty_string(field.get("label")) {
            let is_statement = field_type.is_some_and(|t| STATEMENT_TYPES.contains(&t));
            match field.get("label") {
                Some(label) if is_statement && !label.is_string() && !label.is_null() => {
                    self.error(path("label"), "Field label must be a string");
                }
                _ if is_statement => {
                    self.warning(path("label"), "Section and statement fields should have a label");
                }
                _ => self.error(path("label"), "Field label is required and must be a non-empty string"),
            }
        }

        if let Some(required) = field.get("required") {
            if !required.is_boolean() {
                self.error(path("required"), "Field \"required\" must be a boolean");
            }
        }
        for key in ["placeholder", "helpText", "description"] {
            self.check_optional_string(field, key, &path(key), &format!("Field \"{}\"", key));
        }

        if let Some(field_type) = field_type {
            if OPTION_TYPES.contains(&field_type) {
                self.check_options(&base, field_type, field.get("options"));
            }
            if SELECTION_TYPES.contains(&field_type) {
                self.check_selections(&base, field);
            }
            if NUMERIC_TYPES.contains(&field_type) {
                self.check_numeric_range(&base, field);
            }
        }

        if let Some(validation) = field.get("validation") {
            self.check_validation(&path("validation"), validation);
        }
    }

    fn check_options(&mut self, base: &str, field_type: &str, options: Option<&Value>) {
        let path = format!("{}.options", base);
        let options = match options {
            Some(Value::Array(options)) if !options.is_empty() => options,
            _ => {
                self.error(
                    path,
                    format!("Field type \"{}\" requires a non-empty options array", field_type),
                );
                return;
            }
        };

        for (index, option) in options.iter().enumerate() {
            let option_path = format!("{}[{}]", path, index);
            match option {
                Value::String(label) => {
                    if label.trim().is_empty() {
                        self.error(option_path, "Option must be a non-empty string");
                    }
                }
                Value::Object(choice) => {
                    if !choice.get("id").is_some_and(Value::is_string) {
                        self.error(format!("{}.id", option_path), "Option id must be a string");
                    }
                    if !is_non_empty_string(choice.get("label")) {
                        self.error(
                            format!("{}.label", option_path),
                            "Option label is required and must be a non-empty string",
                        );
                    }
                }
                _ => self.error(
                    option_path,
                    "Option must be a string or an object with id and label",
                ),
            }
        }
    }

    fn check_selections(&mut self, base: &str, field: &Map<String, Value>) {
        let min = field.get("minSelections").and_then(|v| {
            let parsed = as_integer(v).filter(|n| *n >= 0);
            if parsed.is_none() {
                self.error(
                    format!("{}.minSelections", base),
                    "minSelections must be a non-negative integer",
                );
            }
            parsed
        });
        let max = field.get("maxSelections").and_then(|v| {
            let parsed = as_integer(v).filter(|n| *n > 0);
            if parsed.is_none() {
                self.error(
                    format!("{}.maxSelections", base),
                    "maxSelections must be a positive integer",
                );
            }
            parsed
        });

        if let (Some(min), Some(max)) = (min, max) {
            if max < min {
                self.error(
                    format!("{}.maxSelections", base),
                    "maxSelections must be greater than or equal to minSelections",
                );
            }
        }
    }

    fn check_numeric_range(&mut self, base: &str, field: &Map<String, Value>) {
        let mut number = |key: &str| -> Option<f64> {
            let value = field.get(key)?;
            if value.is_number() {
                value.as_f64()
            } else {
                self.error(format!("{}.{}", base, key), format!("{} must be a number", key));
                None
            }
        };
        let min = number("min");
        let max = number("max");
        let _ = number("step");

        if let (Some(min), Some(max)) = (min, max) {
            if min >= max {
                self.error(
                    format!("{}.min", base),
                    "Minimum value must be less than maximum value",
                );
            }
        }
    }

    fn check_validation(&mut self, path: &str, value: &Value) {
        let Some(validation) = value.as_object() else {
            self.error(path, "Validation must be an object");
            return;
        };

        let min_length = validation.get("minLength").and_then(|v| {
            let parsed = as_integer(v).filter(|n| *n >= 0);
            if parsed.is_none() {
                self.error(
                    format!("{}.minLength", path),
                    "minLength must be a non-negative integer",
                );
            }
            parsed
        });
        let max_length = validation.get("maxLength").and_then(|v| {
            let parsed = as_integer(v).filter(|n| *n > 0);
            if parsed.is_none() {
                self.error(format!("{}.maxLength", path), "maxLength must be a positive integer");
            }
            parsed
        });
        if let (Some(min), Some(max)) = (min_length, max_length) {
            if min >= max {
                self.error(
                    format!("{}.minLength", path),
                    "minLength must be less than maxLength",
                );
            }
        }

        for key in ["min", "max"] {
            if validation.get(key).is_some_and(|v| !v.is_number()) {
                self.error(format!("{}.{}", path, key), format!("Validation {} must be a number", key));
            }
        }

        match validation.get("pattern") {
            None => {}
            Some(Value::String(pattern)) => {
                if let Err(e) = Regex::new(pattern) {
                    self.warning(
                        format!("{}.pattern", path),
                        format!("Pattern is not a valid regular expression: {}", e),
                    );
                }
            }
            Some(_) => self.error(format!("{}.pattern", path), "Validation pattern must be a string"),
        }
    }

    fn check_settings(&mut self, value: &Value) {
        let Some(settings) = value.as_object() else {
            self.error("settings", "Settings must be an object");
            return;
        };

        self.check_optional_string(settings, "theme", "settings.theme", "Theme");
        self.check_optional_string(settings, "language", "settings.language", "Language");

        if let Some(submission) = settings.get("submission") {
            match submission.as_object() {
                Some(submission) => {
                    if submission
                        .get("redirectUrl")
                        .is_some_and(|v| !v.is_string() && !v.is_null())
                    {
                        self.error(
                            "settings.submission.redirectUrl",
                            "Redirect URL must be a string or null",
                        );
                    }
                    self.check_optional_string(
                        submission,
                        "successMessage",
                        "settings.submission.successMessage",
                        "Success message",
                    );
                }
                None => self.error("settings.submission", "Submission settings must be an object"),
            }
        }

        if let Some(notifications) = settings.get("notifications") {
            match notifications.as_object() {
                Some(notifications) => self.check_notifications(notifications),
                None => self.error(
                    "settings.notifications",
                    "Notification settings must be an object",
                ),
            }
        }
    }

    fn check_notifications(&mut self, notifications: &Map<String, Value>) {
        if notifications
            .get("sendEmail")
            .is_some_and(|v| !v.is_boolean())
        {
            self.error("settings.notifications.sendEmail", "sendEmail must be a boolean");
        }

        match notifications.get("emails") {
            None => {}
            Some(Value::Array(emails)) => {
                for (index, email) in emails.iter().enumerate() {
                    if !email.is_string() {
                        self.error(
                            format!("settings.notifications.emails[{}]", index),
                            "Email must be a string",
                        );
                    }
                }
            }
            Some(_) => self.error(
                "settings.notifications.emails",
                "Emails must be an array of strings",
            ),
        }
    }

    fn check_optional_string(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
        subject: &str,
    ) {
        if object.get(key).is_some_and(|v| !v.is_string()) {
            self.error(path, format!("{} must be a string", subject));
        }
    }
}

fn is_non_empty_string(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Integer value of a JSON number, accepting whole floats such as `3.0`.
/// Whole floats outside the `i64` range saturate.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_types::SUPPORTED_FIELD_TYPES;
    use serde_json::json;

    fn validate(value: Value) -> ValidationResult {
        SchemaValidator::new().validate(&value)
    }

    fn error_paths(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.path.as_str()).collect()
    }

    fn minimal_field(field_type: &str) -> Value {
        json!({"id": "f1", "type": field_type, "label": "Label"})
    }

    #[test]
    fn test_minimal_valid_import() {
        let result = validate(json!({
            "title": "T",
            "fields": [{"id": "f1", "type": "short_text", "label": "Name", "required": true}]
        }));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_malformed_json_text() {
        let result = SchemaValidator::new().validate_str("{not json");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "root");
        assert!(result.warnings.is_empty());
        assert!(result.fixable_errors.is_empty());
    }

    #[test]
    fn test_string_value_is_parsed() {
        let text = r#"{"title": "T", "fields": [{"id": "a", "type": "email", "label": "Mail"}]}"#;
        let result = validate(Value::String(text.to_string()));
        assert!(result.is_valid);

        let result = validate(Value::String("[1,".to_string()));
        assert_eq!(error_paths(&result), vec!["root"]);
    }

    #[test]
    fn test_non_object_root() {
        let result = validate(json!([1, 2, 3]));
        assert_eq!(error_paths(&result), vec!["root"]);
    }

    #[test]
    fn test_empty_title_and_empty_fields_both_reported() {
        let result = validate(json!({"title": "", "fields": []}));
        assert!(!result.is_valid);
        let paths = error_paths(&result);
        assert!(paths.contains(&"title"));
        assert!(paths.contains(&"fields"));
    }

    #[test]
    fn test_missing_title_and_fields() {
        let result = validate(json!({}));
        assert_eq!(error_paths(&result), vec!["title", "fields"]);
    }

    #[test]
    fn test_fields_not_array_stops_field_checks_and_settings() {
        let result = validate(json!({
            "title": "T",
            "fields": {"id": "f1"},
            "settings": "nope"
        }));
        assert_eq!(error_paths(&result), vec!["fields"]);
    }

    #[test]
    fn test_empty_fields_still_validates_settings() {
        let result = validate(json!({"title": "T", "fields": [], "settings": {"theme": 3}}));
        assert_eq!(error_paths(&result), vec!["fields", "settings.theme"]);
    }

    #[test]
    fn test_unsupported_type_lists_all_types() {
        let result = validate(json!({
            "title": "T",
            "fields": [minimal_field("text"), minimal_field("color_picker")]
        }));
        let type_errors: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.path == "fields[1].type")
            .collect();
        assert_eq!(type_errors.len(), 1);
        for (name, _) in SUPPORTED_FIELD_TYPES {
            assert!(type_errors[0].message.contains(name));
        }
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_sibling_fields_checked_independently() {
        let result = validate(json!({
            "title": "T",
            "fields": [
                {"type": "text", "label": "No id"},
                {"id": "b", "type": "text"},
                "not a field",
                {"id": "d", "type": "number", "label": "Age", "min": 10, "max": 1}
            ]
        }));
        assert_eq!(
            error_paths(&result),
            vec!["fields[0].id", "fields[1].label", "fields[2]", "fields[3].min"]
        );
    }

    #[test]
    fn test_option_types_require_options() {
        for field_type in OPTION_TYPES {
            let result = validate(json!({"title": "T", "fields": [minimal_field(field_type)]}));
            assert_eq!(error_paths(&result), vec!["fields[0].options"], "{}", field_type);

            let mut field = minimal_field(field_type);
            field["options"] = json!([]);
            let result = validate(json!({"title": "T", "fields": [field]}));
            assert_eq!(error_paths(&result), vec!["fields[0].options"], "{}", field_type);
        }
    }

    #[test]
    fn test_bad_options_addressed_by_index() {
        let result = validate(json!({
            "title": "T",
            "fields": [{
                "id": "f1",
                "type": "radio",
                "label": "Pick",
                "options": ["A", "", {"id": "x", "label": "C"}, {"id": 7, "label": ""}, 42]
            }]
        }));
        assert_eq!(
            error_paths(&result),
            vec![
                "fields[0].options[1]",
                "fields[0].options[3].id",
                "fields[0].options[3].label",
                "fields[0].options[4]"
            ]
        );
    }

    #[test]
    fn test_selection_bounds() {
        let field = |min: Value, max: Value| {
            json!({"title": "T", "fields": [{
                "id": "f1", "type": "multi_select", "label": "Pick",
                "options": ["A", "B"], "minSelections": min, "maxSelections": max
            }]})
        };

        assert!(validate(field(json!(1), json!(5))).is_valid);
        assert!(validate(field(json!(2), json!(2))).is_valid);
        assert!(validate(field(json!(0), json!(1.0))).is_valid);

        let result = validate(field(json!(3), json!(2)));
        assert_eq!(error_paths(&result), vec!["fields[0].maxSelections"]);

        let result = validate(field(json!(-1), json!(0)));
        assert_eq!(
            error_paths(&result),
            vec!["fields[0].minSelections", "fields[0].maxSelections"]
        );

        assert!(validate(field(json!(0), json!(1e20))).is_valid);
        assert!(validate(field(json!(0), json!(u64::MAX))).is_valid);

        let result = validate(field(json!(1.5), json!("3")));
        assert_eq!(
            error_paths(&result),
            vec!["fields[0].minSelections", "fields[0].maxSelections"]
        );
    }

    #[test]
    fn test_numeric_range() {
        let field = |extra: Value| {
            let mut f = minimal_field("slider");
            for (k, v) in extra.as_object().unwrap() {
                f[k] = v.clone();
            }
            json!({"title": "T", "fields": [f]})
        };

        assert!(validate(field(json!({"min": 0, "max": 10, "step": 0.5}))).is_valid);
        assert_eq!(
            error_paths(&validate(field(json!({"min": 5, "max": 5})))),
            vec!["fields[0].min"]
        );
        assert_eq!(
            error_paths(&validate(field(json!({"min": 9, "max": 1})))),
            vec!["fields[0].min"]
        );
        assert_eq!(
            error_paths(&validate(field(json!({"min": "0", "step": true})))),
            vec!["fields[0].min", "fields[0].step"]
        );
    }

    #[test]
    fn test_statement_without_label_only_warns() {
        let result = validate(json!({
            "title": "T",
            "fields": [{"id": "s1", "type": "section"}, {"id": "s2", "type": "statement", "label": " "}]
        }));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].path, "fields[0].label");
        assert_eq!(result.warnings[0].severity, Severity::Warning);

        let result = validate(json!({
            "title": "T",
            "fields": [{"id": "s1", "type": "statement", "label": 12}]
        }));
        assert_eq!(error_paths(&result), vec!["fields[0].label"]);
        assert_eq!(result.fixable_errors.len(), 1);
    }

    #[test]
    fn test_field_validation_object() {
        let with_validation = |validation: Value| {
            let mut f = minimal_field("text");
            f["validation"] = validation;
            validate(json!({"title": "T", "fields": [f]}))
        };

        assert!(with_validation(json!({"minLength": 0, "maxLength": 10, "pattern": "^a+$"})).is_valid);
        assert_eq!(
            error_paths(&with_validation(json!({"minLength": 10, "maxLength": 10}))),
            vec!["fields[0].validation.minLength"]
        );
        assert_eq!(
            error_paths(&with_validation(json!({"maxLength": 0, "pattern": 5}))),
            vec!["fields[0].validation.maxLength", "fields[0].validation.pattern"]
        );
        assert_eq!(
            error_paths(&with_validation(json!("strict"))),
            vec!["fields[0].validation"]
        );

        let result = with_validation(json!({"pattern": "(unclosed"}));
        assert!(result.is_valid);
        assert_eq!(result.warnings[0].path, "fields[0].validation.pattern");
    }

    #[test]
    fn test_settings_types() {
        let result = validate(json!({
            "title": "T",
            "fields": [minimal_field("text")],
            "settings": {
                "theme": "dark",
                "language": 1,
                "submission": {"redirectUrl": 5, "successMessage": false},
                "notifications": {"sendEmail": "yes", "emails": ["a@b.co", 3]}
            }
        }));
        assert_eq!(
            error_paths(&result),
            vec![
                "settings.language",
                "settings.submission.redirectUrl",
                "settings.submission.successMessage",
                "settings.notifications.sendEmail",
                "settings.notifications.emails[1]"
            ]
        );

        let result = validate(json!({
            "title": "T",
            "fields": [minimal_field("text")],
            "settings": {"submission": {"redirectUrl": null}, "notifications": {"emails": "a@b.co"}}
        }));
        assert_eq!(error_paths(&result), vec!["settings.notifications.emails"]);
    }

    #[test]
    fn test_fixable_errors_are_type_coercions() {
        let result = validate(json!({
            "title": "T",
            "fields": [{"id": "f1", "type": "text", "label": "Name", "required": "true", "placeholder": 1}]
        }));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.fixable_errors.len(), 2);

        let result = validate(json!({"title": "", "fields": [minimal_field("text")]}));
        assert_eq!(result.errors.len(), 1);
        assert!(result.fixable_errors.is_empty());
    }

    #[test]
    fn test_duplicate_ids_warn() {
        let result = validate(json!({
            "title": "T",
            "fields": [minimal_field("text"), minimal_field("email")]
        }));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "fields[1].id");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let result = validate(json!({
            "title": "T",
            "version": 3,
            "fields": [{"id": "f1", "type": "text", "label": "A", "color": {"r": 1}}],
            "settings": {"customFlag": true}
        }));
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }
}
