//! Axum route handlers for the Forms API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::forms::{run_extract, ExtractOutcome, ExtractSettings, FormSession};
use crate::models::form::{FormEdit, FormState, PersistenceRecord, SkillYearsEdit};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateFormResponse {
    pub form_id: Uuid,
    pub form: FormState,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub form_id: Uuid,
    pub ai_backend: &'static str,
    #[serde(flatten)]
    pub outcome: ExtractOutcome,
}

async fn find_session(state: &AppState, form_id: Uuid) -> Result<Arc<Mutex<FormSession>>, AppError> {
    state
        .forms
        .get(form_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Form {form_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/forms
pub async fn handle_create_form(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateFormResponse>) {
    let (form_id, session) = state.forms.create().await;
    let form = session.lock().await.form.clone();
    info!(%form_id, "form created");
    (StatusCode::CREATED, Json(CreateFormResponse { form_id, form }))
}

/// GET /api/v1/forms/:id
pub async fn handle_get_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormState>, AppError> {
    let session = find_session(&state, form_id).await?;
    let form = session.lock().await.form.clone();
    Ok(Json(form))
}

/// DELETE /api/v1/forms/:id
pub async fn handle_delete_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.forms.remove(form_id).await {
        return Err(AppError::NotFound(format!("Form {form_id} not found")));
    }
    info!(%form_id, "form deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/forms/:id
///
/// Partial user edit. Provided fields overwrite; the rest are untouched.
pub async fn handle_edit_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(edit): Json<FormEdit>,
) -> Result<Json<FormState>, AppError> {
    let session = find_session(&state, form_id).await?;
    let mut guard = session.lock().await;
    guard.form.apply_edit(edit);
    Ok(Json(guard.form.clone()))
}

/// PUT /api/v1/forms/:id/skills
///
/// Writes one skill/years view; the other two are re-derived from it.
pub async fn handle_edit_skills(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(edit): Json<SkillYearsEdit>,
) -> Result<Json<FormState>, AppError> {
    let session = find_session(&state, form_id).await?;
    let mut guard = session.lock().await;
    guard.form.apply_skill_edit(edit);
    Ok(Json(guard.form.clone()))
}

/// POST /api/v1/forms/:id/extract
///
/// Heuristic parse + AI normalization + merge. AI failure degrades to the
/// heuristic result with a warning; a result overtaken by a newer request
/// comes back with status "stale" and is not merged.
pub async fn handle_extract(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.raw_text.trim().is_empty() {
        return Err(AppError::Validation("raw_text cannot be empty".to_string()));
    }

    let session = find_session(&state, form_id).await?;
    let settings = ExtractSettings {
        ai_timeout: Duration::from_secs(state.config.ai_timeout_secs),
        threshold: state.config.ai_confidence_threshold,
    };
    let outcome = run_extract(
        &session,
        state.normalizer.as_ref(),
        &request.raw_text,
        settings,
    )
    .await;

    Ok(Json(ExtractResponse {
        form_id,
        ai_backend: state.normalizer.backend(),
        outcome,
    }))
}

/// GET /api/v1/forms/:id/record
///
/// The flattened record the external persistence API stores.
pub async fn handle_get_record(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<PersistenceRecord>, AppError> {
    let session = find_session(&state, form_id).await?;
    let record = session.lock().await.form.to_record();
    Ok(Json(record))
}
