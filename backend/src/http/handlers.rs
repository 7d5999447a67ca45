//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`TimetableService`](crate::services::TimetableService).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ClassListResponse, DiagnosticsReport, GenerateRequest, GenerationReport, GenerationRun,
    HealthResponse, RunListResponse, SlotEditRequest, StaffDraft, StaffListResponse,
    TimetableListResponse, TimetableView,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{StaffId, StaffMember};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.service.repository().health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
        generator: state.service.generator_name().to_string(),
    }))
}

// =============================================================================
// Staff
// =============================================================================

/// GET /v1/staff
pub async fn list_staff(State(state): State<AppState>) -> HandlerResult<StaffListResponse> {
    let registry = state.service.list_staff().await?;
    Ok(Json(registry.into()))
}

/// POST /v1/staff
pub async fn create_staff(
    State(state): State<AppState>,
    Json(draft): Json<StaffDraft>,
) -> Result<(StatusCode, Json<StaffMember>), AppError> {
    let member = state.service.add_staff(draft).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /v1/staff/{id}
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<StaffDraft>,
) -> HandlerResult<StaffMember> {
    let member = state.service.update_staff(&StaffId::new(id), draft).await?;
    Ok(Json(member))
}

/// DELETE /v1/staff/{id}
pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<StaffMember> {
    let member = state.service.delete_staff(&StaffId::new(id)).await?;
    Ok(Json(member))
}

/// GET /v1/classes
///
/// Classes with at least one qualified staff member, in school order.
pub async fn list_classes(State(state): State<AppState>) -> HandlerResult<ClassListResponse> {
    let classes = state.service.list_classes().await?;
    Ok(Json(ClassListResponse { classes }))
}

// =============================================================================
// Timetables
// =============================================================================

/// GET /v1/timetables
pub async fn list_timetables(
    State(state): State<AppState>,
) -> HandlerResult<TimetableListResponse> {
    let registry = state.service.list_staff().await?;
    let timetables = state.service.timetables().await?;
    Ok(Json(TimetableListResponse::build(&timetables, &registry)))
}

/// GET /v1/timetables/{class}
pub async fn get_timetable(
    State(state): State<AppState>,
    Path(class_name): Path<String>,
) -> HandlerResult<TimetableView> {
    let registry = state.service.list_staff().await?;
    let grid = state.service.timetable(&class_name).await?;
    Ok(Json(TimetableView::build(&class_name, &grid, &registry)))
}

/// POST /v1/timetables/generate
///
/// Runs generation to completion. Generator failures still return 200 with
/// fallback grids and an advisory in the report.
pub async fn generate_timetables(
    State(state): State<AppState>,
    body: Option<Json<GenerateRequest>>,
) -> HandlerResult<GenerationReport> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let report = state.service.generate(request.class_names).await?;
    Ok(Json(report))
}

/// PUT /v1/timetables/{class}/slots
pub async fn edit_slot(
    State(state): State<AppState>,
    Path(class_name): Path<String>,
    Json(request): Json<SlotEditRequest>,
) -> HandlerResult<TimetableView> {
    let edit = request.into_edit(class_name.clone());
    let grid = state.service.edit_slot(edit).await?;
    let registry = state.service.list_staff().await?;
    Ok(Json(TimetableView::build(&class_name, &grid, &registry)))
}

/// GET /v1/diagnostics
pub async fn get_diagnostics(State(state): State<AppState>) -> HandlerResult<DiagnosticsReport> {
    Ok(Json(state.service.diagnostics().await?))
}

/// GET /v1/runs
///
/// Running and recent generation runs, newest first.
pub async fn list_runs(State(state): State<AppState>) -> HandlerResult<RunListResponse> {
    Ok(Json(RunListResponse {
        runs: state.service.generation_runs(),
    }))
}

/// GET /v1/runs/{id}
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> HandlerResult<GenerationRun> {
    state
        .service
        .generation_run(&run_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Generation run '{}' not found", run_id)))
}
