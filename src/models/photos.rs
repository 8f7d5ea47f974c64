// src/models/photos.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pendente,
    Pago,
    Cancelado,
}

// --- Álbuns e fotos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Festival de Inverno 2026")]
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-07-18")]
    pub event_date: Option<NaiveDate>,
    #[schema(example = "15.00")]
    pub price_per_photo: Decimal,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub album_id: Uuid,
    // Chaves no armazenamento. O original nunca sai sem pedido pago.
    #[serde(skip_serializing)]
    pub original_key: String,
    #[serde(skip_serializing)]
    pub preview_key: String,
    #[schema(example = "IMG_0042.jpg")]
    pub file_name: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

// Foto na vitrine, com a prévia (marca d'água) assinada
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPreview {
    #[serde(flatten)]
    pub photo: Photo,
    pub preview_url: String,
}

// --- Pedidos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub album_id: Uuid,
    pub buyer_id: Uuid,
    #[schema(example = "45.00")]
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    // O token só aparece para quem pode ver o pedido (comprador/diretora)
    pub download_token: Option<String>,
    pub download_expires_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhotoOrder {
    /// Verifica se o link de download deste pedido pode ser usado agora.
    /// A expiração é checada antes do token: link vencido é recusado mesmo com token válido.
    pub fn authorize_download(&self, token: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.payment_status != PaymentStatus::Pago {
            return Err(AppError::OrderNotPaid);
        }

        let (Some(expected), Some(expires_at)) = (&self.download_token, self.download_expires_at)
        else {
            return Err(AppError::InvalidDownloadToken);
        };

        if now >= expires_at {
            return Err(AppError::DownloadExpired);
        }

        if !bool::from(expected.as_bytes().ct_eq(token.as_bytes())) {
            return Err(AppError::InvalidDownloadToken);
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoOrderDetail {
    #[serde(flatten)]
    pub order: PhotoOrder,
    pub album_title: String,
    pub photo_ids: Vec<Uuid>,
}

// Link assinado de um original
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedDownload {
    pub photo_id: Uuid,
    pub file_name: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadBundle {
    pub order_id: Uuid,
    pub link_expires_at: DateTime<Utc>,
    pub files: Vec<SignedDownload>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumPayload {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Festival de Inverno 2026")]
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-07-18")]
    pub event_date: Option<NaiveDate>,
    #[schema(example = "15.00")]
    pub price_per_photo: Decimal,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumPayload {
    #[validate(length(min = 2, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub event_date: Option<NaiveDate>,
    pub price_per_photo: Option<Decimal>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub album_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "invalid_selection"))]
    pub photo_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn paid_order(expires_at: DateTime<Utc>) -> PhotoOrder {
        let now = Utc::now();
        PhotoOrder {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            album_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            total_amount: Decimal::new(4500, 2),
            payment_status: PaymentStatus::Pago,
            download_token: Some("a".repeat(64)),
            download_expires_at: Some(expires_at),
            paid_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn valid_token_before_expiry_is_accepted() {
        let now = Utc::now();
        let order = paid_order(now + Duration::hours(1));
        assert!(order.authorize_download(&"a".repeat(64), now).is_ok());
    }

    #[test]
    fn expired_link_is_rejected_even_with_the_right_token() {
        let now = Utc::now();
        let order = paid_order(now - Duration::seconds(1));
        assert!(matches!(
            order.authorize_download(&"a".repeat(64), now),
            Err(AppError::DownloadExpired)
        ));
        // exatamente no instante da expiração também já não vale
        let order = paid_order(now);
        assert!(matches!(
            order.authorize_download(&"a".repeat(64), now),
            Err(AppError::DownloadExpired)
        ));
    }

    #[test]
    fn wrong_token_is_rejected() {
        let now = Utc::now();
        let order = paid_order(now + Duration::hours(1));
        assert!(matches!(
            order.authorize_download(&"b".repeat(64), now),
            Err(AppError::InvalidDownloadToken)
        ));
        assert!(matches!(
            order.authorize_download("", now),
            Err(AppError::InvalidDownloadToken)
        ));
        // Prefixo do token certo também não serve
        assert!(matches!(
            order.authorize_download(&"a".repeat(63), now),
            Err(AppError::InvalidDownloadToken)
        ));
    }

    #[test]
    fn unpaid_orders_cannot_download() {
        let now = Utc::now();
        let mut order = paid_order(now + Duration::hours(1));
        order.payment_status = PaymentStatus::Pendente;
        assert!(matches!(
            order.authorize_download(&"a".repeat(64), now),
            Err(AppError::OrderNotPaid)
        ));
    }

    #[test]
    fn original_keys_are_never_serialized() {
        let photo = Photo {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            album_id: Uuid::new_v4(),
            original_key: "t/a/originals/x.jpg".into(),
            preview_key: "t/a/previews/x.jpg".into(),
            file_name: "x.jpg".into(),
            width: 10,
            height: 10,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert!(json.get("originalKey").is_none());
        assert!(json.get("previewKey").is_none());
    }
}
