//! Import → internal schema transformation.
//!
//! Runs only on documents the validator accepted. It performs no checks of its
//! own: malformed input yields defaulted values, not errors.

use crate::field_types::{resolve_field_type, FieldType};
use crate::form_schema::{
    create_default_schema, BlockSettings, FieldSettings, FieldValidation, FormBlock, FormField,
    FormSchema, FormSettings, NotificationSettings, StatementAlign, StatementSize, TypeSettings,
    DARK_PRIMARY_COLOR, LIGHT_PRIMARY_COLOR, REQUIRED_MESSAGE,
};
use crate::import_schema::{ImportedFormField, ImportedFormSchema, ImportedSettings};
use crate::validator::as_integer;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

/// Language codes rendered right-to-left.
pub const RTL_LANGUAGES: &[&str] = &["ar", "he", "ur", "fa"];

const RATING_STAR_COUNT: u8 = 5;
const RATING_ICON: &str = "star";
const RATING_COLOR: &str = "#fbbf24";
const TAGS_MAX: u32 = 10;

/// Source of identifiers for generated fields and blocks.
pub trait IdSource: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Random v4 UUIDs, e.g. `field_9f1c...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}

/// Deterministic counter, e.g. `field_1`, `block_2`.
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    next: AtomicU64,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}_{}", prefix, n)
    }
}

/// Builds an internal [`FormSchema`] from a validated import.
#[derive(Debug, Default)]
pub struct ImportTransformer<I = UuidIdSource> {
    ids: I,
}

impl ImportTransformer<UuidIdSource> {
    pub fn new() -> Self {
        Self { ids: UuidIdSource }
    }
}

impl<I: IdSource> ImportTransformer<I> {
    pub fn with_id_source(ids: I) -> Self {
        Self { ids }
    }

    /// Transform a validated import into a single-block form schema.
    pub fn transform(&self, import: &ImportedFormSchema) -> FormSchema {
        let mut schema =
            create_default_schema(&import.title, import.description.as_deref().unwrap_or(""));
        schema.settings.single_step = false;

        // First occurrence of each imported id keeps it; generated ids avoid all of them.
        let mut owner_of: HashMap<&str, usize> = HashMap::new();
        for (index, field) in import.fields.iter().enumerate() {
            if let Some(id) = usable_id(field) {
                owner_of.entry(id).or_insert(index);
            }
        }
        let mut taken: HashSet<String> = owner_of.keys().map(|id| id.to_string()).collect();

        let fields: Vec<FormField> = import
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let id = match usable_id(field) {
                    Some(id) if owner_of.get(id) == Some(&index) => id.to_string(),
                    _ => {
                        let generated = self.fresh_id("field", &mut taken);
                        debug!("Generated id {} for field {:?}", generated, field.label);
                        generated
                    }
                };
                transform_field(field, id)
            })
            .collect();

        merge_settings(&mut schema.settings, import.settings.as_ref(), &import.title);

        schema.blocks = vec![FormBlock {
            id: self.fresh_id("block", &mut taken),
            title: import.title.clone(),
            description: None,
            fields: fields.clone(),
            settings: BlockSettings::default(),
        }];
        schema.fields = fields;

        info!(
            "Transformed import \"{}\": {} fields",
            import.title,
            schema.fields.len()
        );
        schema
    }

    /// Next id from the source that no field already uses.
    fn fresh_id(&self, prefix: &str, taken: &mut HashSet<String>) -> String {
        loop {
            let id = self.ids.next_id(prefix);
            if taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn usable_id(field: &ImportedFormField) -> Option<&str> {
    field.id.as_deref().filter(|id| !id.trim().is_empty())
}

/// Map one imported field. Pure apart from the id handed in.
pub fn transform_field(field: &ImportedFormField, id: String) -> FormField {
    let field_type = resolve_field_type(&field.field_type).unwrap_or(FieldType::Text);
    let label = field.label.clone().unwrap_or_default();

    let options: Vec<String> = field
        .options
        .iter()
        .flatten()
        .map(|option| option.normalized_label())
        .collect();

    FormField {
        id,
        field_type,
        validation: derive_validation(field, field_type),
        settings: derive_settings(field, field_type, &label),
        label,
        description: field.description.clone(),
        placeholder: field.placeholder.clone(),
        required: field.required.unwrap_or(false),
        options: (!options.is_empty()).then_some(options),
    }
}

fn derive_validation(field: &ImportedFormField, field_type: FieldType) -> Option<FieldValidation> {
    let mut validation = FieldValidation::default();

    if let Some(imported) = &field.validation {
        validation.min_length = imported.min_length.map(to_count);
        validation.max_length = imported.max_length.map(to_count);
        validation.min = imported.min;
        validation.max = imported.max;
        validation.pattern = imported.pattern.clone();
    }

    if matches!(field_type, FieldType::Number | FieldType::Slider) {
        if field.min.is_some() {
            validation.min = field.min;
        }
        if field.max.is_some() {
            validation.max = field.max;
        }
    }

    if field.required == Some(true) {
        validation.required_message = Some(REQUIRED_MESSAGE.to_string());
    }

    (!validation.is_empty()).then_some(validation)
}

fn derive_settings(field: &ImportedFormField, field_type: FieldType, label: &str) -> FieldSettings {
    let kind = match field_type {
        FieldType::Textarea => TypeSettings::Textarea {
            rows: field
                .rows
                .as_ref()
                .and_then(as_integer)
                .and_then(|rows| u32::try_from(rows).ok()),
        },
        FieldType::Number | FieldType::Slider => TypeSettings::Numeric {
            min: field.min,
            max: field.max,
            step: field.step,
        },
        FieldType::Checkbox => TypeSettings::Checkbox {
            min: field.min_selections.map(to_count),
            max: field.max_selections.map(to_count),
        },
        FieldType::Select => TypeSettings::Select {
            allow_multiple: field.field_type == "multi_select",
        },
        FieldType::Statement => TypeSettings::Statement {
            statement_heading: label.to_string(),
            statement_description: field.description.clone(),
            statement_align: StatementAlign::Left,
            statement_size: StatementSize::Md,
        },
        FieldType::Rating => TypeSettings::Rating {
            star_count: RATING_STAR_COUNT,
            icon: RATING_ICON.to_string(),
            color: RATING_COLOR.to_string(),
        },
        FieldType::Tags => TypeSettings::Tags {
            max_tags: TAGS_MAX,
            allow_duplicates: false,
        },
        _ => TypeSettings::None,
    };

    // defaultChecked is applied last and wins over defaultValue.
    let default_value = field
        .default_checked
        .clone()
        .or_else(|| field.default_value.clone());

    FieldSettings {
        help_text: field.help_text.clone(),
        default_value,
        kind,
    }
}

/// Overlay imported form settings onto the defaults.
fn merge_settings(settings: &mut FormSettings, imported: Option<&ImportedSettings>, title: &str) {
    let Some(imported) = imported else {
        return;
    };

    settings.primary_color = match imported.theme.as_deref() {
        Some("dark") => DARK_PRIMARY_COLOR,
        _ => LIGHT_PRIMARY_COLOR,
    }
    .to_string();

    if let Some(submission) = &imported.submission {
        if let Some(message) = &submission.success_message {
            settings.success_message = message.clone();
        }
        if let Some(url) = &submission.redirect_url {
            settings.redirect_url = Some(url.clone());
        }
    }

    if let Some(notifications) = &imported.notifications {
        settings.notifications = NotificationSettings {
            enabled: notifications.send_email.unwrap_or(false),
            email: notifications
                .emails
                .as_ref()
                .and_then(|emails| emails.first().cloned()),
            subject: Some(format!("New submission: {}", title)),
        };
    }

    settings.rtl = imported
        .language
        .as_deref()
        .is_some_and(|language| RTL_LANGUAGES.contains(&language));
}

fn to_count(value: f64) -> u64 {
    value.max(0.0) as u64
}
