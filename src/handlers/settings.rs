// src/handlers/settings.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{DirectorOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::{settings::UpdateSettingsRequest, tenancy::Tenant},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses(
        (status = 200, description = "Identidade visual da escola", body = Tenant)
    ),
    params(
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .tenant_service
        .get_settings(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações atualizadas", body = Tenant),
        (status = 400, description = "Cor ou URL inválida"),
        (status = 409, description = "Domínio já usado por outra escola")
    ),
    params(
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .tenant_service
        .update_settings(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}
