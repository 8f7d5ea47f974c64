// src/handlers/attendance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, StaffOnly},
        tenancy::TenantContext,
    },
    models::attendance::{AttendanceQuery, AttendanceRecord, AttendanceSheet, TakeAttendancePayload},
};

// POST /api/classes/{id}/attendance
#[utoipa::path(
    post,
    path = "/api/classes/{id}/attendance",
    tag = "Chamada",
    request_body = TakeAttendancePayload,
    responses(
        (status = 200, description = "Chamada registrada", body = Vec<AttendanceRecord>),
        (status = 400, description = "Aluna sem matrícula ativa na turma"),
        (status = 403, description = "Professora de outra turma")
    ),
    params(("id" = Uuid, Path, description = "ID da turma")),
    security(("api_jwt" = []))
)]
pub async fn take_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(taker): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TakeAttendancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let records = app_state
        .attendance_service
        .take_attendance(&taker, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(records)))
}

// GET /api/classes/{id}/attendance?date=
#[utoipa::path(
    get,
    path = "/api/classes/{id}/attendance",
    tag = "Chamada",
    responses(
        (status = 200, description = "Lista do dia; presença nula = não registrada", body = AttendanceSheet)
    ),
    params(
        ("id" = Uuid, Path, description = "ID da turma"),
        ("date" = String, Query, description = "Data da aula (AAAA-MM-DD)")
    ),
    security(("api_jwt" = []))
)]
pub async fn attendance_sheet(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Query(query): Query<AttendanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sheet = app_state
        .attendance_service
        .sheet(&viewer, tenant.0, id, query.date)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sheet)))
}
