// src/handlers/photos.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{DirectorOnly, PhotoBuyers, RequireRole},
        tenancy::TenantContext,
    },
    models::photos::{
        Album, CreateAlbumPayload, CreateOrderPayload, Photo, PhotoOrder, PhotoOrderDetail, PhotoPreview,
        UpdateAlbumPayload, UploadPhotoQuery,
    },
};

#[derive(Debug, Deserialize, Default)]
pub struct OrderListQuery {
    #[serde(default)]
    pub mine: bool,
}

// =============================================================================
//  ÁREA 1: ÁLBUNS
// =============================================================================

// POST /api/photos/albums
#[utoipa::path(
    post,
    path = "/api/photos/albums",
    tag = "Fotos",
    request_body = CreateAlbumPayload,
    responses(
        (status = 201, description = "Álbum criado", body = Album)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_album(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Json(payload): Json<CreateAlbumPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let album = app_state
        .photo_service
        .create_album(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(album)))
}

// GET /api/photos/albums
#[utoipa::path(
    get,
    path = "/api/photos/albums",
    tag = "Fotos",
    responses(
        (status = 200, description = "Álbuns (compradores só veem os publicados)", body = Vec<Album>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_albums(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let albums = app_state
        .photo_service
        .list_albums(&viewer, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(albums)))
}

// PUT /api/photos/albums/{id}
#[utoipa::path(
    put,
    path = "/api/photos/albums/{id}",
    tag = "Fotos",
    request_body = UpdateAlbumPayload,
    responses(
        (status = 200, description = "Álbum atualizado (ou publicado)", body = Album),
        (status = 404, description = "Álbum não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do álbum")),
    security(("api_jwt" = []))
)]
pub async fn update_album(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAlbumPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let album = app_state
        .photo_service
        .update_album(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(album)))
}

// =============================================================================
//  ÁREA 2: FOTOS
// =============================================================================

// POST /api/photos/albums/{id}/photos?fileName=
#[utoipa::path(
    post,
    path = "/api/photos/albums/{id}/photos",
    tag = "Fotos",
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Bytes da imagem (JPEG ou PNG)"),
    responses(
        (status = 201, description = "Foto guardada; prévia com marca d'água gerada", body = Photo),
        (status = 400, description = "Arquivo não é uma imagem válida")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do álbum"),
        ("fileName" = Option<String>, Query, description = "Nome original do arquivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadPhotoQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let photo = app_state
        .photo_service
        .upload_photo(tenant.0, id, query.file_name.as_deref(), body.to_vec())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// GET /api/photos/albums/{id}/photos
#[utoipa::path(
    get,
    path = "/api/photos/albums/{id}/photos",
    tag = "Fotos",
    responses(
        (status = 200, description = "Fotos com URL assinada da prévia", body = Vec<PhotoPreview>),
        (status = 404, description = "Álbum não encontrado ou não publicado")
    ),
    params(("id" = Uuid, Path, description = "ID do álbum")),
    security(("api_jwt" = []))
)]
pub async fn list_photos(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let photos = app_state
        .photo_service
        .list_photos(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(photos)))
}

// =============================================================================
//  ÁREA 3: PEDIDOS
// =============================================================================

// POST /api/photos/orders
#[utoipa::path(
    post,
    path = "/api/photos/orders",
    tag = "Fotos",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado como pendente", body = PhotoOrderDetail),
        (status = 400, description = "Seleção vazia ou foto de outro álbum")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(buyer): AuthenticatedUser,
    _guard: RequireRole<PhotoBuyers>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .photo_service
        .create_order(&buyer, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/photos/orders
#[utoipa::path(
    get,
    path = "/api/photos/orders",
    tag = "Fotos",
    responses(
        (status = 200, description = "Pedidos do usuário (a direção vê todos)", body = Vec<PhotoOrder>)
    ),
    params(("mine" = Option<bool>, Query, description = "Só os pedidos do próprio usuário")),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .photo_service
        .list_orders(&viewer, tenant.0, query.mine)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/photos/orders/{id}
#[utoipa::path(
    get,
    path = "/api/photos/orders/{id}",
    tag = "Fotos",
    responses(
        (status = 200, description = "Pedido com as fotos escolhidas", body = PhotoOrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .photo_service
        .get_order(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(order)))
}

// POST /api/photos/orders/{id}/confirm-payment
#[utoipa::path(
    post,
    path = "/api/photos/orders/{id}/confirm-payment",
    tag = "Fotos",
    responses(
        (status = 200, description = "Pagamento confirmado; token e validade do download gerados", body = PhotoOrder),
        (status = 409, description = "Pedido não está pendente")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<DirectorOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .photo_service
        .confirm_payment(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(order)))
}

// POST /api/photos/orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/photos/orders/{id}/cancel",
    tag = "Fotos",
    responses(
        (status = 200, description = "Pedido cancelado", body = PhotoOrder),
        (status = 409, description = "Pedido não está pendente")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    AuthenticatedUser(viewer): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .photo_service
        .cancel_order(&viewer, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(order)))
}
