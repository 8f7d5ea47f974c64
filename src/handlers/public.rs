// src/handlers/public.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        photos::{DownloadBundle, DownloadQuery, SignedDownload},
        tenancy::TenantResolution,
    },
    storage::content_type_for,
};

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    // ?escola=<slug> força a escola (útil em localhost e nos domínios da plataforma)
    pub escola: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignedObjectQuery {
    pub expires: i64,
    pub signature: String,
}

// Atrás de proxy o host original vem no X-Forwarded-Host
fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|value| value.to_str().ok())
}

// GET /api/public/tenant
#[utoipa::path(
    get,
    path = "/api/public/tenant",
    tag = "Público",
    responses(
        (status = 200, description = "Escola do hostname ou estado de plataforma", body = TenantResolution)
    ),
    params(
        ("escola" = Option<String>, Query, description = "Slug da escola (sobrepõe o hostname)")
    )
)]
pub async fn resolve_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resolution = app_state
        .tenant_service
        .resolve(request_host(&headers), query.escola.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(resolution)))
}

// GET /api/public/downloads/{order_id}
#[utoipa::path(
    get,
    path = "/api/public/downloads/{order_id}",
    tag = "Público",
    responses(
        (status = 200, description = "URLs assinadas dos originais do pedido", body = DownloadBundle),
        (status = 403, description = "Pedido não pago ou token inválido"),
        (status = 410, description = "Link expirado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido"),
        ("token" = String, Query, description = "Token de download do pedido")
    )
)]
pub async fn download_bundle(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(order_id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bundle = app_state
        .photo_service
        .download_bundle(order_id, &query.token)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bundle)))
}

// GET /api/public/downloads/{order_id}/photos/{photo_id}
#[utoipa::path(
    get,
    path = "/api/public/downloads/{order_id}/photos/{photo_id}",
    tag = "Público",
    responses(
        (status = 200, description = "URL assinada de um original", body = SignedDownload),
        (status = 403, description = "Pedido não pago ou token inválido"),
        (status = 410, description = "Link expirado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido"),
        ("photo_id" = Uuid, Path, description = "ID da foto"),
        ("token" = String, Query, description = "Token de download do pedido")
    )
)]
pub async fn download_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((order_id, photo_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .photo_service
        .download_photo(order_id, photo_id, &query.token)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(file)))
}

// GET /storage/{*key}
pub async fn serve_object(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(key): Path<String>,
    Query(query): Query<SignedObjectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = app_state
        .photo_service
        .fetch_signed_object(&key, query.expires, &query.signature)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=300"),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_host_wins_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("api.interno:3000"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("espacorevelle.com.br"));
        assert_eq!(request_host(&headers), Some("espacorevelle.com.br"));

        headers.remove("x-forwarded-host");
        assert_eq!(request_host(&headers), Some("api.interno:3000"));
    }
}
