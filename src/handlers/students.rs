// src/handlers/students.rs

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
        rbac::{DirectorOnly, GuardianOnly, MetricsEditors, RequireRole, StaffOnly, StudentOnly},
        tenancy::TenantContext,
    },
    models::{
        attendance::StudentAttendanceHistory,
        students::{
            BodyMetric, CreateBodyMetricPayload, CreateStudentPayload, Student, StudentDetail, StudentFilter,
            UpdateStudentStatusPayload,
        },
    },
};

// =============================================================================
//  ÁREA 1: CADASTRO
// =============================================================================

// GET /api/students
#[utoipa::path(
    get,
    path = "/api/students",
    tag = "Alunas",
    responses(
        (status = 200, description = "Lista de alunas", body = Vec<Student>)
    ),
    params(
        ("status" = Option<String>, Query, description = "ativo | inativo | trancado"),
        ("search" = Option<String>, Query, description = "Busca por nome"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_students(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<StaffOnly>,
    Query(filter): Query<StudentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let students = app_state
        .student_service
        .list(tenant.0, &filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(students)))
}

// GET /api/students/{id}
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    tag = "Alunas",
    responses(
        (status = 200, description = "Ficha da aluna com as medidas", body = StudentDetail),
        (status = 403, description = "Sem acesso a esta aluna"),
        (status = 404, description = "Aluna não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn get_student(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .student_service
        .get_detail(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/students
#[utoipa::path(
    post,
    path = "/api/students",
    tag = "Alunas",
    request_body = CreateStudentPayload,
    responses(
        (status = 201, description = "Aluna cadastrada", body = Student),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_student(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Json(payload): Json<CreateStudentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let student = app_state
        .student_service
        .create(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(student)))
}

// PUT /api/students/{id}
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    tag = "Alunas",
    request_body = CreateStudentPayload,
    responses(
        (status = 200, description = "Cadastro atualizado", body = Student),
        (status = 404, description = "Aluna não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn update_student(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateStudentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let student = app_state
        .student_service
        .update(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(student)))
}

// PUT /api/students/{id}/status
#[utoipa::path(
    put,
    path = "/api/students/{id}/status",
    tag = "Alunas",
    request_body = UpdateStudentStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Student),
        (status = 404, description = "Aluna não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn update_student_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudentStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let student = app_state
        .student_service
        .set_status(tenant.0, id, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(student)))
}

// =============================================================================
//  ÁREA 2: MEDIDAS E PRESENÇA
// =============================================================================

// POST /api/students/{id}/metrics
#[utoipa::path(
    post,
    path = "/api/students/{id}/metrics",
    tag = "Alunas",
    request_body = CreateBodyMetricPayload,
    responses(
        (status = 201, description = "Medida registrada", body = BodyMetric)
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn add_metric(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<MetricsEditors>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBodyMetricPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let metric = app_state
        .student_service
        .add_metric(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(metric)))
}

// GET /api/students/{id}/metrics
#[utoipa::path(
    get,
    path = "/api/students/{id}/metrics",
    tag = "Alunas",
    responses(
        (status = 200, description = "Histórico de medidas", body = Vec<BodyMetric>)
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn list_metrics(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = app_state
        .student_service
        .list_metrics(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(metrics)))
}

// GET /api/students/{id}/attendance
#[utoipa::path(
    get,
    path = "/api/students/{id}/attendance",
    tag = "Alunas",
    responses(
        (status = 200, description = "Histórico de presença e taxa de frequência", body = StudentAttendanceHistory)
    ),
    params(("id" = Uuid, Path, description = "ID da aluna")),
    security(("api_jwt" = []))
)]
pub async fn attendance_history(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .student_service
        .attendance_history(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(history)))
}

// =============================================================================
//  ÁREA 3: PORTAIS (RESPONSÁVEL E ALUNA)
// =============================================================================

// GET /api/me/students
#[utoipa::path(
    get,
    path = "/api/me/students",
    tag = "Alunas",
    responses(
        (status = 200, description = "Alunas sob responsabilidade do usuário", body = Vec<Student>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_students(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(guardian): AuthenticatedUser,
    _guard: RequireRole<GuardianOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let students = app_state
        .student_service
        .list_for_guardian(tenant.0, &guardian)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(students)))
}

// GET /api/me/student
#[utoipa::path(
    get,
    path = "/api/me/student",
    tag = "Alunas",
    responses(
        (status = 200, description = "Cadastro da própria aluna", body = Student),
        (status = 404, description = "Perfil sem cadastro de aluna vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_student(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(profile): AuthenticatedUser,
    _guard: RequireRole<StudentOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let student = app_state
        .student_service
        .my_student(tenant.0, &profile)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(student)))
}
