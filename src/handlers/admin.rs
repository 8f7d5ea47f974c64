// src/handlers/admin.rs

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
        i18n::Locale,
        rbac::{RequireRole, SuperAdminOnly},
    },
    models::tenancy::{CreateTenantPayload, Tenant, TenantOverview, UpdateBillingPayload, UpdateTenantPayload},
};

// GET /api/admin/tenants
#[utoipa::path(
    get,
    path = "/api/admin/tenants",
    tag = "Admin",
    responses(
        (status = 200, description = "Escolas com alunas ativas e equipe", body = Vec<TenantOverview>),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperAdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let tenants = app_state
        .tenant_service
        .list_overview()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenants)))
}

// POST /api/admin/tenants
#[utoipa::path(
    post,
    path = "/api/admin/tenants",
    tag = "Admin",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Escola criada com a conta da diretora", body = Tenant),
        (status = 409, description = "Slug ou e-mail já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperAdminOnly>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .tenant_service
        .create_tenant_with_director(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// PUT /api/admin/tenants/{id}
#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}",
    tag = "Admin",
    request_body = UpdateTenantPayload,
    responses(
        (status = 200, description = "Escola atualizada", body = Tenant),
        (status = 404, description = "Escola não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da escola")),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperAdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .tenant_service
        .update_tenant(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenant)))
}

// DELETE /api/admin/tenants/{id}
// Escola nunca é apagada: só desativada.
#[utoipa::path(
    delete,
    path = "/api/admin/tenants/{id}",
    tag = "Admin",
    responses(
        (status = 200, description = "Escola desativada", body = Tenant),
        (status = 404, description = "Escola não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da escola")),
    security(("api_jwt" = []))
)]
pub async fn deactivate_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperAdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = UpdateTenantPayload { name: None, plan: None, is_active: Some(false) };

    let tenant = app_state
        .tenant_service
        .update_tenant(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenant)))
}

// PUT /api/admin/tenants/{id}/billing
#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}/billing",
    tag = "Admin",
    request_body = UpdateBillingPayload,
    responses(
        (status = 200, description = "Cobrança atualizada", body = Tenant),
        (status = 404, description = "Escola não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da escola")),
    security(("api_jwt" = []))
)]
pub async fn update_billing(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperAdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBillingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .tenant_service
        .update_billing(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenant)))
}
