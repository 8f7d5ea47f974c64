// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Role,
};

/// 1. O conjunto de papéis aceito por uma rota
pub trait RoleGuard: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// 2. O Extractor (Guardião). Precisa rodar depois do `auth_guard`/`tenant_guard`.
pub struct RequireRole<G>(pub PhantomData<G>);

impl<G, S> FromRequestParts<S> for RequireRole<G>
where
    G: RoleGuard,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !G::allowed().contains(&user.0.role) {
            tracing::debug!("Papel '{}' barrado na rota {}", user.0.role, parts.uri.path());
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// CONJUNTOS DE PAPÉIS
// ---

pub struct DirectorOnly;
impl RoleGuard for DirectorOnly {
    fn allowed() -> &'static [Role] { &[Role::Diretora, Role::SuperAdmin] }
}

pub struct SuperAdminOnly;
impl RoleGuard for SuperAdminOnly {
    fn allowed() -> &'static [Role] { &[Role::SuperAdmin] }
}

// Direção e equipe pedagógica
pub struct StaffOnly;
impl RoleGuard for StaffOnly {
    fn allowed() -> &'static [Role] {
        &[Role::Diretora, Role::Professor, Role::Monitor, Role::SuperAdmin]
    }
}

// Medidas corporais: direção e professores
pub struct MetricsEditors;
impl RoleGuard for MetricsEditors {
    fn allowed() -> &'static [Role] { &[Role::Diretora, Role::Professor, Role::SuperAdmin] }
}

pub struct GuardianOnly;
impl RoleGuard for GuardianOnly {
    fn allowed() -> &'static [Role] { &[Role::Responsavel] }
}

pub struct StudentOnly;
impl RoleGuard for StudentOnly {
    fn allowed() -> &'static [Role] { &[Role::Estudante] }
}

// Quem pode comprar fotos
pub struct PhotoBuyers;
impl RoleGuard for PhotoBuyers {
    fn allowed() -> &'static [Role] { &[Role::Responsavel, Role::Estudante, Role::Diretora] }
}
