// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::{Profile, Role},
};

const TENANT_ID_HEADER: &str = "x-tenant-id";

// Extrator para obter o perfil autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Profile);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                ApiError {
                    status: AppError::InvalidToken.status_code(),
                    error: "Usuário não autenticado".into(),
                    details: None,
                }
            })
    }
}

async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<Profile, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    app_state.auth_service.validate_token(bearer.token()).await
}

/// Lê o X-Tenant-ID. `None` quando o cabeçalho não veio.
fn tenant_header(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    match headers.get(TENANT_ID_HEADER) {
        None => Ok(None),
        Some(value) => {
            let raw = value.to_str().map_err(|_| AppError::TenantHeaderInvalid)?;
            Uuid::parse_str(raw.trim())
                .map(Some)
                .map_err(|_| AppError::TenantHeaderInvalid)
        }
    }
}

/// Escola da requisição: a do perfil; o super_admin escolhe pelo cabeçalho.
pub fn resolve_tenant(profile: &Profile, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    if profile.role == Role::SuperAdmin {
        return requested.ok_or(AppError::TenantRequired);
    }

    let own = profile.tenant_id.ok_or(AppError::Forbidden)?;
    match requested {
        Some(other) if other != own => Err(AppError::TenantMismatch),
        _ => Ok(own),
    }
}

// Só autenticação: o perfil vai para os extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let profile = authenticate(&app_state, request.headers())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

// Autenticação + contexto da escola
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let profile = authenticate(&app_state, request.headers()).await.map_err(to_api)?;
    let requested = tenant_header(request.headers()).map_err(to_api)?;
    let tenant_id = resolve_tenant(&profile, requested).map_err(to_api)?;

    request.extensions_mut().insert(AuthenticatedUser(profile));
    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn profile(role: Role, tenant_id: Option<Uuid>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            tenant_id,
            email: "x@escola.com".into(),
            full_name: "Fulana".into(),
            role,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn staff_uses_own_tenant() {
        let tenant = Uuid::new_v4();
        let p = profile(Role::Professor, Some(tenant));
        assert_eq!(resolve_tenant(&p, None).unwrap(), tenant);
        assert_eq!(resolve_tenant(&p, Some(tenant)).unwrap(), tenant);
    }

    #[test]
    fn foreign_tenant_header_is_rejected() {
        let p = profile(Role::Diretora, Some(Uuid::new_v4()));
        assert!(matches!(
            resolve_tenant(&p, Some(Uuid::new_v4())),
            Err(AppError::TenantMismatch)
        ));
    }

    #[test]
    fn super_admin_must_pick_a_tenant() {
        let p = profile(Role::SuperAdmin, None);
        assert!(matches!(resolve_tenant(&p, None), Err(AppError::TenantRequired)));

        let chosen = Uuid::new_v4();
        assert_eq!(resolve_tenant(&p, Some(chosen)).unwrap(), chosen);
    }

    #[test]
    fn malformed_tenant_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("escola-1"));
        assert!(matches!(tenant_header(&headers), Err(AppError::TenantHeaderInvalid)));
        assert_eq!(tenant_header(&HeaderMap::new()).unwrap(), None);
    }
}
