// src/handlers/billing.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{DirectorOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::billing::BillingOverview,
};

// GET /api/billing
#[utoipa::path(
    get,
    path = "/api/billing",
    tag = "Cobrança",
    responses(
        (status = 200, description = "Plano, mensalidade e vencimento da escola", body = BillingOverview)
    ),
    params(
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da escola (apenas super_admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_billing(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let school = app_state
        .tenant_service
        .get_tenant(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let overview = BillingOverview::from_tenant(&school, Utc::now().date_naive());

    Ok((StatusCode::OK, Json(overview)))
}
