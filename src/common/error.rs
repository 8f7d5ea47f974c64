// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erro interno da aplicação. Cada variante vira uma chave de mensagem traduzida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Slug já existe: {0}")]
    SlugAlreadyExists(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Autenticou, mas não existe linha em `profiles`
    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Perfil desativado")]
    ProfileInactive,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Cabeçalho X-Tenant-ID ausente")]
    TenantRequired,

    #[error("Cabeçalho X-Tenant-ID inválido")]
    TenantHeaderInvalid,

    #[error("Escola diferente da do perfil")]
    TenantMismatch,

    #[error("Escola desativada")]
    TenantInactive,

    /// Recurso inexistente (ou de outra escola). O payload é a chave i18n.
    #[error("Não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Turma lotada")]
    ClassFull,

    #[error("Estudante já matriculado")]
    AlreadyEnrolled,

    #[error("Estudante sem matrícula ativa: {0}")]
    StudentNotEnrolled(uuid::Uuid),

    #[error("Papel não atribuível")]
    RoleNotAssignable,

    #[error("Alteração do próprio acesso")]
    OwnAccessChange,

    #[error("Pedido sem fotos")]
    EmptyOrder,

    #[error("Foto fora do álbum")]
    PhotoNotInAlbum,

    #[error("Pedido não está pendente")]
    OrderNotPending,

    #[error("Pedido não pago")]
    OrderNotPaid,

    #[error("Link de download expirado")]
    DownloadExpired,

    #[error("Token de download inválido")]
    InvalidDownloadToken,

    #[error("Imagem inválida: {0}")]
    InvalidImage(String),

    #[error("Assinatura de URL inválida")]
    InvalidSignature,

    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::TenantRequired
            | AppError::TenantHeaderInvalid
            | AppError::StudentNotEnrolled(_)
            | AppError::EmptyOrder
            | AppError::PhotoNotInAlbum
            | AppError::InvalidImage(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::ProfileNotFound
            | AppError::ProfileInactive
            | AppError::Forbidden
            | AppError::TenantMismatch
            | AppError::TenantInactive
            | AppError::RoleNotAssignable
            | AppError::OwnAccessChange
            | AppError::OrderNotPaid
            | AppError::InvalidDownloadToken
            | AppError::InvalidSignature => StatusCode::FORBIDDEN,

            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::SlugAlreadyExists(_)
            | AppError::UniqueConstraintViolation(_)
            | AppError::ClassFull
            | AppError::AlreadyEnrolled
            | AppError::OrderNotPending => StatusCode::CONFLICT,

            AppError::DownloadExpired => StatusCode::GONE,

            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::SlugAlreadyExists(_) => "slug_already_exists",
            AppError::UniqueConstraintViolation(_) => "unique_violation",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::ProfileNotFound => "profile_not_found",
            AppError::ProfileInactive => "profile_inactive",
            AppError::Forbidden => "forbidden",
            AppError::TenantRequired => "tenant_header_required",
            AppError::TenantHeaderInvalid => "tenant_header_invalid",
            AppError::TenantMismatch => "tenant_mismatch",
            AppError::TenantInactive => "tenant_inactive",
            AppError::NotFound(key) => *key,
            AppError::ClassFull => "class_full",
            AppError::AlreadyEnrolled => "already_enrolled",
            AppError::StudentNotEnrolled(_) => "student_not_enrolled",
            AppError::RoleNotAssignable => "role_not_assignable",
            AppError::OwnAccessChange => "own_access_change",
            AppError::EmptyOrder => "order_empty",
            AppError::PhotoNotInAlbum => "photo_not_in_album",
            AppError::OrderNotPending => "order_not_pending",
            AppError::OrderNotPaid => "order_not_paid",
            AppError::DownloadExpired => "download_expired",
            AppError::InvalidDownloadToken => "download_token_invalid",
            AppError::InvalidImage(_) => "invalid_image",
            AppError::InvalidSignature => "invalid_signature",
            _ => "internal_error",
        }
    }

    /// Converte para a resposta HTTP, traduzindo a mensagem para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();
        let error = store.translate(&locale.0, self.message_key());

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log, o cliente recebe a mensagem genérica
            tracing::error!("Erro Interno do Servidor: {}", self);
            return ApiError { status, error, details: None };
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::StudentNotEnrolled(student_id) => Some(json!({ "studentId": student_id })),
            AppError::SlugAlreadyExists(slug) => Some(json!({ "slug": slug })),
            AppError::UniqueConstraintViolation(what) => Some(json!({ "constraint": what })),
            AppError::InvalidImage(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

/// Rejeição HTTP padrão da API: `{ "error": "...", "details": {...} }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn missing_profile_asks_to_contact_the_administrator() {
        let api = AppError::ProfileNotFound.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.error, "Perfil não encontrado. Contate o administrador.");
    }

    #[test]
    fn expired_download_is_gone() {
        let api = AppError::DownloadExpired.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::GONE);
        assert_eq!(api.error, "The download link has expired.");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn not_found_uses_the_resource_key() {
        let api = AppError::NotFound("class_not_found").to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Turma não encontrada.");
    }
}
