// src/models/tenancy.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// 1. Tenant (a escola)
// ---

// Situação da assinatura da escola na plataforma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "billing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Trial,
    Ativo,
    Inadimplente,
    Cancelado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Espaço Revelle")]
    pub name: String,
    #[schema(example = "espaco-revelle")]
    pub slug: String,
    #[schema(example = "espacorevelle.com.br")]
    pub custom_domain: Option<String>,
    #[schema(example = "#7C3AED")]
    pub primary_color: String,
    #[schema(example = "#F59E0B")]
    pub secondary_color: String,
    pub logo_url: Option<String>,
    #[schema(example = "basico")]
    pub plan: String,
    pub billing_status: BillingStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2026-11-10")]
    pub billing_due_date: Option<NaiveDate>,
    #[schema(example = "199.90")]
    pub monthly_fee: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Branding (o que o front precisa para se vestir com a cara da escola)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantBranding {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: Option<String>,
}

impl From<&Tenant> for TenantBranding {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
            primary_color: tenant.primary_color.clone(),
            secondary_color: tenant.secondary_color.clone(),
            logo_url: tenant.logo_url.clone(),
        }
    }
}

// Resultado da resolução por hostname: plataforma (SaaS) ou uma escola
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantResolution {
    Platform,
    Tenant { branding: TenantBranding },
}

// Resumo para a listagem do super_admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub tenant: Tenant,
    pub active_students: i64,
    pub staff_count: i64,
}

// ---
// 3. Payloads do super_admin
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 2, message = "O nome da escola é obrigatório."))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[schema(example = "profissional")]
    pub plan: Option<String>,
    pub monthly_fee: Option<Decimal>,
    pub custom_domain: Option<String>,

    // Conta da diretora criada junto com a escola
    #[validate(length(min = 2, message = "required"))]
    pub director_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub director_email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub director_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantPayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: Option<String>,
    pub plan: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillingPayload {
    pub billing_status: BillingStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2026-11-10")]
    pub billing_due_date: Option<NaiveDate>,
    pub monthly_fee: Option<Decimal>,
    pub plan: Option<String>,
}

/// Slug: minúsculas, dígitos e hífen; não começa nem termina com hífen.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = (2..=63).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_slug");
        err.message = Some("Use apenas letras minúsculas, números e hífen.".into());
        Err(err)
    }
}

/// Cor no formato #RRGGBB
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let ok = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_color");
        err.message = Some("Use o formato #RRGGBB.".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert!(validate_slug("espaco-revelle").is_ok());
        assert!(validate_slug("ballet2024").is_ok());
        assert!(validate_slug("-revelle").is_err());
        assert!(validate_slug("Espaco").is_err());
        assert!(validate_slug("espaço").is_err());
        assert!(validate_slug("a").is_err());
    }

    #[test]
    fn colors() {
        assert!(validate_hex_color("#7C3AED").is_ok());
        assert!(validate_hex_color("#7c3aed").is_ok());
        assert!(validate_hex_color("7C3AED").is_err());
        assert!(validate_hex_color("#7C3AE").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn platform_resolution_serializes_with_kind_tag() {
        let json = serde_json::to_value(TenantResolution::Platform).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "platform" }));
    }
}
