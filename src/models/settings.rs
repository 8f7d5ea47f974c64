// src/models/settings.rs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::tenancy::validate_hex_color;

// Branding editável pela diretora (white-label)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Espaço Revelle")]
    pub name: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#7C3AED")]
    pub primary_color: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#F59E0B")]
    pub secondary_color: Option<String>,

    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://espacorevelle.com.br/logo.png")]
    pub logo_url: Option<String>,

    #[schema(example = "espacorevelle.com.br")]
    pub custom_domain: Option<String>,
}
