// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::auth::Role;

// Notificação já com o estado de leitura do perfil que consulta
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub recipient_id: Option<Uuid>,
    #[schema(value_type = Option<String>, example = "responsavel")]
    pub target_role: Option<Role>,
    #[schema(example = "Ensaio extra no sábado")]
    pub title: String,
    pub body: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_audience"))]
pub struct CreateNotificationPayload {
    #[validate(length(min = 2, max = 120, message = "required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "required"))]
    pub body: String,
    // Sem destinatário e sem papel = toda a escola
    pub recipient_id: Option<Uuid>,
    #[schema(value_type = Option<String>, example = "professor")]
    pub target_role: Option<Role>,
}

fn validate_audience(payload: &CreateNotificationPayload) -> Result<(), ValidationError> {
    match (&payload.recipient_id, &payload.target_role) {
        (Some(_), Some(_)) => {
            let mut err = ValidationError::new("ambiguous_audience");
            err.message = Some("Informe um destinatário ou um papel, não ambos.".into());
            Err(err)
        }
        (_, Some(role)) if !role.is_known() || *role == Role::SuperAdmin => {
            let mut err = ValidationError::new("invalid_role");
            err.message = Some("Papel de destino inválido.".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(recipient_id: Option<Uuid>, target_role: Option<Role>) -> CreateNotificationPayload {
        CreateNotificationPayload {
            title: "Aviso".into(),
            body: "Não haverá aula na segunda.".into(),
            recipient_id,
            target_role,
        }
    }

    #[test]
    fn audience_rules() {
        assert!(payload(None, None).validate().is_ok());
        assert!(payload(Some(Uuid::new_v4()), None).validate().is_ok());
        assert!(payload(None, Some(Role::Responsavel)).validate().is_ok());
        assert!(payload(Some(Uuid::new_v4()), Some(Role::Professor)).validate().is_err());
        assert!(payload(None, Some(Role::Unknown("x".into()))).validate().is_err());
        assert!(payload(None, Some(Role::SuperAdmin)).validate().is_err());
    }
}
