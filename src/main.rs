//! Form Importer - HTTP host for the JSON form import pipeline.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use form_importer::config::ServerConfig;
use form_importer::field_types::SUPPORTED_FIELD_TYPES;
use form_importer::form_store::{FormRepository, InMemoryFormStore, StoredForm};
use form_importer::{FormImporter, ImportError, ImportTransformResult, ValidationResult};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    importer: Arc<FormImporter>,
    forms: Arc<dyn FormRepository>,
    config: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "form_importer=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let body_limit = config.max_upload_bytes();
    let addr = config.addr.clone();

    let state = AppState {
        importer: Arc::new(FormImporter::new()),
        forms: Arc::new(InMemoryFormStore::new()),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/field-types", get(field_types))
        .route("/import/validate", post(validate_import))
        .route("/import", post(import_text))
        .route("/import/upload", post(import_upload))
        .route("/forms/import", post(import_and_store))
        .route("/forms", get(list_forms))
        .route("/forms/:id", get(get_form))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldTypeEntry {
    import_type: &'static str,
    internal_type: &'static str,
}

/// List every accepted import type and what it maps to.
async fn field_types() -> Json<Vec<FieldTypeEntry>> {
    Json(
        SUPPORTED_FIELD_TYPES
            .iter()
            .map(|(name, field_type)| FieldTypeEntry {
                import_type: *name,
                internal_type: field_type.as_str(),
            })
            .collect(),
    )
}

/// Validate pasted JSON without transforming it.
async fn validate_import(State(state): State<AppState>, body: String) -> Json<ValidationResult> {
    Json(state.importer.validate_str(&body))
}

/// Import pasted JSON text.
async fn import_text(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ImportTransformResult>) {
    respond(state.importer.import_bytes(body.to_vec()))
}

/// Import an uploaded JSON file (multipart part named `file`).
async fn import_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<ImportTransformResult>) {
    match read_upload(multipart, state.config.read_timeout).await {
        Ok(bytes) => respond(state.importer.import_bytes(bytes)),
        Err(e) => {
            error!("Upload failed: {}", e);
            respond(ImportTransformResult::from_error(e))
        }
    }
}

#[derive(serde::Deserialize)]
struct StoreQuery {
    owner: Option<String>,
}

#[derive(serde::Serialize)]
struct StoreResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<StoredForm>,
    result: ImportTransformResult,
}

/// Import pasted JSON and, when it succeeds, persist the resulting form.
async fn import_and_store(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<StoreResponse>), (StatusCode, String)> {
    let result = state.importer.import_bytes(body.to_vec());

    let Some(schema) = result.form_schema.clone().filter(|_| result.success) else {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(StoreResponse { form: None, result }),
        ));
    };

    let owner = query
        .owner
        .unwrap_or_else(|| state.config.default_owner.clone());
    let title = schema.settings.title.clone();

    let form = state
        .forms
        .create_form(&title, &owner, schema)
        .await
        .map_err(|e| {
            error!("Failed to store imported form: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to store form: {}", e))
        })?;

    info!("Stored imported form {} for {}", form.id, owner);
    Ok((
        StatusCode::CREATED,
        Json(StoreResponse {
            form: Some(form),
            result,
        }),
    ))
}

async fn list_forms(State(state): State<AppState>) -> Json<Vec<StoredForm>> {
    Json(state.forms.list_forms().await)
}

async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredForm>, StatusCode> {
    state
        .forms
        .get_form(&id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// ============================================================================
// Helper functions
// ============================================================================

/// Read the `file` part of a multipart upload, bounded by `timeout`.
async fn read_upload(mut multipart: Multipart, timeout: Duration) -> Result<Vec<u8>, ImportError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Upload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("import.json").to_string();
            let bytes = tokio::time::timeout(timeout, field.bytes())
                .await
                .map_err(|_| ImportError::Timeout(timeout))?
                .map_err(|e| ImportError::Upload(e.to_string()))?;
            info!("Received import file: {} ({} bytes)", filename, bytes.len());
            return Ok(bytes.to_vec());
        }
    }

    Err(ImportError::Upload("No file part named \"file\"".to_string()))
}

fn respond(result: ImportTransformResult) -> (StatusCode, Json<ImportTransformResult>) {
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(result))
}
