//! Axum route handlers for the Resume API.
//!
//! Each handler takes the store's write lock for one operation, requests an
//! autosave when the operation changed something, and answers with the
//! updated resume.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::resume::models::{
    Contact, EducationPatch, EntryId, ExperiencePatch, NewEducation, NewExperience, NewSkill,
    Resume, ResumeId, ResumePatch, SectionKind, SectionOrder, SkillPatch,
};
use crate::resume::render::render_markdown;
use crate::resume::scoring::ScoreReport;
use crate::resume::store::{ResumeStore, StoreError};
use crate::resume::suggestions::{suggested_skills, suggestions_for, Suggestion};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub name: String,
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}

/// Dashboard card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: ResumeId,
    pub name: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub score: u8,
    pub is_current: bool,
    /// At least one change can be undone.
    pub can_undo: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentResume {
    pub id: Option<ResumeId>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOrderRequest {
    pub section_order: SectionOrder,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub section: SectionKind,
}

#[derive(Debug, Deserialize)]
pub struct SkillSuggestionQuery {
    pub category: String,
    pub resume_id: Option<ResumeId>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn resume_of(store: &ResumeStore, id: ResumeId) -> Result<Resume, AppError> {
    store
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::ResumeNotFound(id).into())
}

/// Runs one store mutation; on success schedules an autosave and returns the resume.
async fn mutate<T>(
    state: &AppState,
    id: ResumeId,
    op: impl FnOnce(&mut ResumeStore) -> Result<T, StoreError>,
) -> Result<(T, Resume), AppError> {
    let mut store = state.store.write().await;
    let output = op(&mut store)?;
    state.autosave.request();
    Ok((output, resume_of(&store, id)?))
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Json<Vec<ResumeSummary>> {
    let store = state.store.read().await;
    let current = store.current_resume_id();
    let summaries = store
        .resumes()
        .iter()
        .map(|r| ResumeSummary {
            id: r.id,
            name: r.name.clone(),
            template: r.template.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
            score: store.resume_score(r.id),
            is_current: current == Some(r.id),
            can_undo: store.history_len(r.id) > 1,
        })
        .collect();
    Json(summaries)
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateResumeRequest>,
) -> (StatusCode, Json<CreatedResponse<ResumeId>>) {
    let id = state
        .store
        .write()
        .await
        .create_resume(req.name, req.template);
    state.autosave.request();
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<Json<Resume>, AppError> {
    let store = state.store.read().await;
    Ok(Json(resume_of(&store, id)?))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(patch): AppJson<ResumePatch>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.update_resume(id, patch)).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<StatusCode, AppError> {
    state.store.write().await.delete_resume(id)?;
    state.autosave.request();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/session/current
pub async fn handle_get_current(State(state): State<AppState>) -> Json<CurrentResume> {
    Json(CurrentResume {
        id: state.store.read().await.current_resume_id(),
    })
}

/// PUT /api/v1/session/current
pub async fn handle_set_current(
    State(state): State<AppState>,
    AppJson(req): AppJson<CurrentResume>,
) -> Result<StatusCode, AppError> {
    state.store.write().await.set_current_resume(req.id)?;
    state.autosave.request();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.undo(id)).await?;
    Ok(Json(resume))
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/resumes/:id/contact
pub async fn handle_update_contact(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(contact): AppJson<Contact>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.update_contact(id, contact)).await?;
    Ok(Json(resume))
}

/// PUT /api/v1/resumes/:id/summary
pub async fn handle_update_summary(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(req): AppJson<SummaryRequest>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.update_summary(id, req.summary)).await?;
    Ok(Json(resume))
}

/// PUT /api/v1/resumes/:id/section-order
pub async fn handle_update_section_order(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(req): AppJson<SectionOrderRequest>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| {
        store.update_section_order(id, req.section_order)
    })
    .await?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes/:id/experiences
pub async fn handle_add_experience(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(entry): AppJson<NewExperience>,
) -> Result<(StatusCode, Json<CreatedResponse<EntryId>>), AppError> {
    let (entry_id, _) = mutate(&state, id, |store| store.add_experience(id, entry)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: entry_id })))
}

/// PATCH /api/v1/resumes/:id/experiences/:entry_id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
    AppJson(patch): AppJson<ExperiencePatch>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| {
        store.update_experience(id, entry_id, patch)
    })
    .await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id/experiences/:entry_id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.delete_experience(id, entry_id)).await?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes/:id/education
pub async fn handle_add_education(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(entry): AppJson<NewEducation>,
) -> Result<(StatusCode, Json<CreatedResponse<EntryId>>), AppError> {
    let (entry_id, _) = mutate(&state, id, |store| store.add_education(id, entry)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: entry_id })))
}

/// PATCH /api/v1/resumes/:id/education/:entry_id
pub async fn handle_update_education(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
    AppJson(patch): AppJson<EducationPatch>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| {
        store.update_education(id, entry_id, patch)
    })
    .await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id/education/:entry_id
pub async fn handle_delete_education(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.delete_education(id, entry_id)).await?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes/:id/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    AppJson(entry): AppJson<NewSkill>,
) -> Result<(StatusCode, Json<CreatedResponse<EntryId>>), AppError> {
    let (entry_id, _) = mutate(&state, id, |store| store.add_skill(id, entry)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: entry_id })))
}

/// PATCH /api/v1/resumes/:id/skills/:entry_id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
    AppJson(patch): AppJson<SkillPatch>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.update_skill(id, entry_id, patch)).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id/skills/:entry_id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(ResumeId, EntryId)>,
) -> Result<Json<Resume>, AppError> {
    let ((), resume) = mutate(&state, id, |store| store.delete_skill(id, entry_id)).await?;
    Ok(Json(resume))
}

// ────────────────────────────────────────────────────────────────────────────
// Derived views
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes/:id/score
pub async fn handle_score(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<Json<ScoreReport>, AppError> {
    Ok(Json(state.store.read().await.score_report(id)?))
}

/// GET /api/v1/resumes/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    let resume = store.get(id).ok_or(StoreError::ResumeNotFound(id))?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_markdown(resume),
    ))
}

/// GET /api/v1/resumes/:id/suggestions?section=
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    let store = state.store.read().await;
    let resume = store.get(id).ok_or(StoreError::ResumeNotFound(id))?;
    Ok(Json(suggestions_for(query.section, resume)))
}

/// GET /api/v1/skills/suggestions?category=&resume_id=
pub async fn handle_skill_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SkillSuggestionQuery>,
) -> Result<Json<Vec<&'static str>>, AppError> {
    let store = state.store.read().await;
    let resume = match query.resume_id {
        Some(id) => Some(store.get(id).ok_or(StoreError::ResumeNotFound(id))?),
        None => None,
    };
    Ok(Json(suggested_skills(&query.category, resume)))
}

/// POST /api/v1/session/save
pub async fn handle_save_now(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.autosave.save_now().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/session
/// Drops every resume and removes the saved slot.
pub async fn handle_clear_session(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.autosave.cancel();
    state.store.write().await.clear();
    // Runs on the autosave task, after any save already writing.
    state.autosave.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
