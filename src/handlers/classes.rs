// src/handlers/classes.rs

use axum::{
    extract::{Path, State},
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
        rbac::{DirectorOnly, RequireRole, StaffOnly},
        tenancy::TenantContext,
    },
    models::classes::{
        AddSchedulePayload, ClassDetail, ClassSchedule, ClassSummary, CreateClassPayload, EnrollPayload, Enrollment,
        UpdateClassPayload,
    },
};

// GET /api/classes
#[utoipa::path(
    get,
    path = "/api/classes",
    tag = "Turmas",
    responses(
        (status = 200, description = "Turmas com a ocupação atual", body = Vec<ClassSummary>)
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_classes(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = app_state
        .class_service
        .list(&viewer, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(classes)))
}

// GET /api/classes/{id}
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    tag = "Turmas",
    responses(
        (status = 200, description = "Turma com horários e alunas matriculadas", body = ClassDetail),
        (status = 404, description = "Turma não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da turma")),
    security(("api_jwt" = []))
)]
pub async fn get_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .class_service
        .get_detail(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/classes
#[utoipa::path(
    post,
    path = "/api/classes",
    tag = "Turmas",
    request_body = CreateClassPayload,
    responses(
        (status = 201, description = "Turma criada", body = ClassSummary),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Json(payload): Json<CreateClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let class = app_state
        .class_service
        .create(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(class)))
}

// PUT /api/classes/{id}
#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    tag = "Turmas",
    request_body = UpdateClassPayload,
    responses(
        (status = 200, description = "Turma atualizada", body = ClassSummary),
        (status = 404, description = "Turma não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da turma")),
    security(("api_jwt" = []))
)]
pub async fn update_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let class = app_state
        .class_service
        .update(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(class)))
}

// POST /api/classes/{id}/schedules
#[utoipa::path(
    post,
    path = "/api/classes/{id}/schedules",
    tag = "Turmas",
    request_body = AddSchedulePayload,
    responses(
        (status = 201, description = "Horário adicionado", body = ClassSchedule)
    ),
    params(("id" = Uuid, Path, description = "ID da turma")),
    security(("api_jwt" = []))
)]
pub async fn add_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddSchedulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let schedule = app_state
        .class_service
        .add_schedule(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

// DELETE /api/classes/{id}/schedules/{schedule_id}
#[utoipa::path(
    delete,
    path = "/api/classes/{id}/schedules/{schedule_id}",
    tag = "Turmas",
    responses(
        (status = 204, description = "Horário removido"),
        (status = 404, description = "Horário não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da turma"),
        ("schedule_id" = Uuid, Path, description = "ID do horário")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path((id, schedule_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .class_service
        .remove_schedule(tenant.0, id, schedule_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/classes/{id}/enrollments
#[utoipa::path(
    post,
    path = "/api/classes/{id}/enrollments",
    tag = "Turmas",
    request_body = EnrollPayload,
    responses(
        (status = 201, description = "Aluna matriculada", body = Enrollment),
        (status = 409, description = "Turma lotada ou aluna já matriculada")
    ),
    params(("id" = Uuid, Path, description = "ID da turma")),
    security(("api_jwt" = []))
)]
pub async fn enroll_student(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnrollPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = app_state
        .class_service
        .enroll(tenant.0, id, payload.student_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

// DELETE /api/classes/{id}/enrollments/{student_id}
#[utoipa::path(
    delete,
    path = "/api/classes/{id}/enrollments/{student_id}",
    tag = "Turmas",
    responses(
        (status = 200, description = "Matrícula cancelada", body = Enrollment),
        (status = 404, description = "Matrícula não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da turma"),
        ("student_id" = Uuid, Path, description = "ID da aluna")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_enrollment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = app_state
        .class_service
        .cancel_enrollment(tenant.0, id, student_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(enrollment)))
}
