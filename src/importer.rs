//! Import pipeline: raw text or file → validation → transformation.
//!
//! Every entry point returns an [`ImportTransformResult`]; parse, validation,
//! shape and I/O failures are all reported inside it rather than as `Err`.

use crate::error::{ImportError, Result};
use crate::form_schema::FormSchema;
use crate::import_schema::ImportedFormSchema;
use crate::transformer::{IdSource, ImportTransformer, UuidIdSource};
use crate::validator::{SchemaValidator, ValidationResult};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one import attempt.
///
/// `success` is true exactly when `form_schema` is present and `errors` is empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTransformResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_schema: Option<FormSchema>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationResult>,
}

impl ImportTransformResult {
    fn succeeded(schema: FormSchema, validation: ValidationResult) -> Self {
        Self {
            success: true,
            form_schema: Some(schema),
            errors: Vec::new(),
            warnings: render(&validation.warnings),
            validation_result: Some(validation),
        }
    }

    fn rejected(validation: ValidationResult) -> Self {
        Self {
            success: false,
            form_schema: None,
            errors: render(&validation.errors),
            warnings: render(&validation.warnings),
            validation_result: Some(validation),
        }
    }

    /// Failure result for an attempt that never reached validation, such as an
    /// unreadable upload.
    pub fn from_error(error: ImportError) -> Self {
        Self::failed(error, None)
    }

    fn failed(error: ImportError, validation: Option<ValidationResult>) -> Self {
        let warnings = validation
            .as_ref()
            .map(|v| render(&v.warnings))
            .unwrap_or_default();
        Self {
            success: false,
            form_schema: None,
            errors: vec![error.to_string()],
            warnings,
            validation_result: validation,
        }
    }
}

fn render<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Runs the validator and, if it passes, the transformer.
#[derive(Debug, Default)]
pub struct FormImporter<I = UuidIdSource> {
    validator: SchemaValidator,
    transformer: ImportTransformer<I>,
}

impl FormImporter<UuidIdSource> {
    pub fn new() -> Self {
        Self::with_id_source(UuidIdSource)
    }
}

impl<I: IdSource> FormImporter<I> {
    pub fn with_id_source(ids: I) -> Self {
        Self {
            validator: SchemaValidator::new(),
            transformer: ImportTransformer::with_id_source(ids),
        }
    }

    /// Validate only.
    pub fn validate_str(&self, text: &str) -> ValidationResult {
        self.validator.validate_str(text)
    }

    /// Import pasted or uploaded JSON text.
    pub fn import_str(&self, text: &str) -> ImportTransformResult {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.import_document(&value),
            Err(e) => {
                let error = ImportError::Parse(e);
                let validation = ValidationResult::parse_failure(error.to_string());
                ImportTransformResult::rejected(validation)
            }
        }
    }

    /// Import raw uploaded bytes, which must be UTF-8.
    pub fn import_bytes(&self, bytes: Vec<u8>) -> ImportTransformResult {
        match String::from_utf8(bytes) {
            Ok(text) => self.import_str(&text),
            Err(e) => ImportTransformResult::from_error(e.into()),
        }
    }

    /// Import an already parsed JSON value. A JSON string is parsed as document text.
    pub fn import_value(&self, value: &Value) -> ImportTransformResult {
        match value {
            Value::String(text) => self.import_str(text),
            other => self.import_document(other),
        }
    }

    /// Read a file fully as UTF-8 and import it. The read is bounded by `timeout`.
    pub async fn import_file(&self, path: impl AsRef<Path>, timeout: Duration) -> ImportTransformResult {
        let path = path.as_ref();
        match read_import_file(path, timeout).await {
            Ok(text) => self.import_str(&text),
            Err(e) => {
                warn!("Import file {:?} unreadable: {}", path, e);
                ImportTransformResult::from_error(e)
            }
        }
    }

    fn import_document(&self, value: &Value) -> ImportTransformResult {
        let validation = self.validator.validate(value);
        if !validation.is_valid {
            info!(
                "Import rejected: {} errors, {} warnings",
                validation.errors.len(),
                validation.warnings.len()
            );
            return ImportTransformResult::rejected(validation);
        }

        let import: ImportedFormSchema = match serde_json::from_value(value.clone()) {
            Ok(import) => import,
            Err(e) => {
                warn!("Validated import failed typed decoding: {}", e);
                return ImportTransformResult::failed(ImportError::Shape(e), Some(validation));
            }
        };

        let schema = self.transformer.transform(&import);
        ImportTransformResult::succeeded(schema, validation)
    }
}

/// Read an import file as UTF-8 text. The file handle is released on every
/// exit path, including timeout.
pub async fn read_import_file(path: &Path, timeout: Duration) -> Result<String> {
    let bytes = tokio::time::timeout(timeout, tokio::fs::read(path))
        .await
        .map_err(|_| ImportError::Timeout(timeout))?
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(String::from_utf8(bytes)?)
}
