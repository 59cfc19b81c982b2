//! Form import pipeline.
//!
//! Turns a user-supplied JSON form description into the internal
//! [`form_schema::FormSchema`]: the [`validator`] reports every structural
//! defect with its path, then the [`transformer`] maps the accepted document
//! into a single-block schema. [`importer::FormImporter`] ties the two together
//! and never returns an error across its boundary.

pub mod config;
pub mod error;
pub mod field_types;
pub mod form_schema;
pub mod form_store;
pub mod import_schema;
pub mod importer;
pub mod transformer;
pub mod validator;

pub use error::ImportError;
pub use form_schema::FormSchema;
pub use importer::{FormImporter, ImportTransformResult};
pub use transformer::{IdSource, ImportTransformer, SequentialIdSource, UuidIdSource};
pub use validator::{SchemaValidator, Severity, ValidationError, ValidationResult};
