// src/handlers/crm.rs

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
        i18n::Locale,
        rbac::{DirectorOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::crm::{
        AdvanceLeadResponse, CreateLeadPayload, FunnelStage, Lead, LeadFilter, SetLeadStatusPayload,
        UpdateLeadPayload, LEAD_ALREADY_ENROLLED,
    },
};

// =============================================================================
//  ÁREA 1: LEADS
// =============================================================================

// POST /api/crm/leads
#[utoipa::path(
    post,
    path = "/api/crm/leads",
    tag = "CRM",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado na etapa Novo", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .crm_service
        .create_lead(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/crm/leads
#[utoipa::path(
    get,
    path = "/api/crm/leads",
    tag = "CRM",
    responses(
        (status = 200, description = "Lista de leads", body = Vec<Lead>)
    ),
    params(
        ("status" = Option<String>, Query, description = "Filtra por etapa do funil"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Query(filter): Query<LeadFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .crm_service
        .list_leads(tenant.0, filter.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leads)))
}

// GET /api/crm/leads/{id}
#[utoipa::path(
    get,
    path = "/api/crm/leads/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .crm_service
        .get_lead(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// PUT /api/crm/leads/{id}
#[utoipa::path(
    put,
    path = "/api/crm/leads/{id}",
    tag = "CRM",
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .crm_service
        .update_lead(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/crm/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/crm/leads/{id}",
    tag = "CRM",
    responses(
        (status = 204, description = "Lead removido"),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete_lead(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: FUNIL
// =============================================================================

// POST /api/crm/leads/{id}/advance
#[utoipa::path(
    post,
    path = "/api/crm/leads/{id}/advance",
    tag = "CRM",
    responses(
        (status = 200, description = "Lead avançado; em Matriculado nada muda e vem uma mensagem", body = AdvanceLeadResponse),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn advance_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .crm_service
        .advance_lead(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?
        .with_notice(|| app_state.i18n_store.translate(&locale.0, LEAD_ALREADY_ENROLLED));

    Ok((StatusCode::OK, Json(response)))
}

// PUT /api/crm/leads/{id}/status
#[utoipa::path(
    put,
    path = "/api/crm/leads/{id}/status",
    tag = "CRM",
    request_body = SetLeadStatusPayload,
    responses(
        (status = 200, description = "Etapa ajustada manualmente", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn set_lead_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetLeadStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .crm_service
        .set_status(tenant.0, id, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// GET /api/crm/funnel
#[utoipa::path(
    get,
    path = "/api/crm/funnel",
    tag = "CRM",
    responses(
        (status = 200, description = "Quantidade de leads por etapa, na ordem do funil", body = Vec<FunnelStage>)
    ),
    security(("api_jwt" = []))
)]
pub async fn funnel(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let stages = app_state
        .crm_service
        .funnel(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stages)))
}
