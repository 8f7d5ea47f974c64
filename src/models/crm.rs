// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco.
// O funil é linear: Novo -> Aula Experimental -> Aguardando Resposta -> Matriculado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
pub enum LeadStatus {
    #[serde(rename = "Novo")]
    Novo,
    #[serde(rename = "Aula Experimental")]
    AulaExperimental,
    #[serde(rename = "Aguardando Resposta")]
    AguardandoResposta,
    #[serde(rename = "Matriculado")]
    Matriculado,
}

impl LeadStatus {
    pub const FUNNEL: [LeadStatus; 4] = [
        LeadStatus::Novo,
        LeadStatus::AulaExperimental,
        LeadStatus::AguardandoResposta,
        LeadStatus::Matriculado,
    ];

    /// Próxima etapa do funil. `Matriculado` é terminal.
    pub fn next(self) -> Option<LeadStatus> {
        match self {
            LeadStatus::Novo => Some(LeadStatus::AulaExperimental),
            LeadStatus::AulaExperimental => Some(LeadStatus::AguardandoResposta),
            LeadStatus::AguardandoResposta => Some(LeadStatus::Matriculado),
            LeadStatus::Matriculado => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::Novo => "Novo",
            LeadStatus::AulaExperimental => "Aula Experimental",
            LeadStatus::AguardandoResposta => "Aguardando Resposta",
            LeadStatus::Matriculado => "Matriculado",
        }
    }
}

// --- LEAD ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Juliana Martins")]
    pub name: String,
    #[schema(example = "(11) 97777-6666")]
    pub phone: Option<String>,
    pub email: Option<String>,
    // Modalidade de interesse
    #[schema(example = "Ballet Infantil")]
    pub interest: Option<String>,
    // De onde veio (Instagram, indicação...)
    #[schema(example = "Instagram")]
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: LeadStatus,
    pub trial_class_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resposta do "avançar status"
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceLeadResponse {
    pub lead: Lead,
    pub advanced: bool,
    // Mensagem informativa quando não há para onde avançar
    pub message: Option<String>,
}

// Chave i18n da mensagem de lead já matriculado
pub const LEAD_ALREADY_ENROLLED: &str = "lead_already_enrolled";

impl AdvanceLeadResponse {
    /// Um passo à frente no funil, sem gravar nada. Em `Matriculado` o lead
    /// volta como está e `advanced` fica falso.
    pub fn step(mut lead: Lead) -> Self {
        match lead.status.next() {
            Some(next) => {
                lead.status = next;
                Self { lead, advanced: true, message: None }
            }
            None => Self { lead, advanced: false, message: None },
        }
    }

    /// Anexa a mensagem informativa quando o lead não avançou.
    pub fn with_notice(mut self, notice: impl FnOnce() -> String) -> Self {
        if !self.advanced {
            self.message = Some(notice());
        }
        self
    }
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub status: LeadStatus,
    pub total: i64,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Juliana Martins")]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub interest: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub trial_class_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub interest: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub trial_class_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetLeadStatusPayload {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::i18n::I18nStore;

    #[test]
    fn advancing_walks_the_funnel_in_order() {
        let mut status = LeadStatus::Novo;
        let mut visited = vec![status];
        while let Some(next) = status.next() {
            status = next;
            visited.push(status);
        }
        assert_eq!(visited, LeadStatus::FUNNEL.to_vec());
    }

    #[test]
    fn matriculado_is_terminal() {
        assert_eq!(LeadStatus::Matriculado.next(), None);
    }

    fn lead(status: LeadStatus) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Juliana Martins".into(),
            phone: None,
            email: None,
            interest: Some("Ballet Infantil".into()),
            source: Some("Instagram".into()),
            notes: None,
            status,
            trial_class_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn advancing_an_enrolled_lead_is_a_no_op_with_a_message() {
        let store = I18nStore::load().unwrap();
        let notice = || store.translate("pt", LEAD_ALREADY_ENROLLED);

        // Novo -> Aula Experimental -> Aguardando Resposta -> Matriculado
        let mut current = lead(LeadStatus::Novo);
        for expected in [
            LeadStatus::AulaExperimental,
            LeadStatus::AguardandoResposta,
            LeadStatus::Matriculado,
        ] {
            let response = AdvanceLeadResponse::step(current).with_notice(notice);
            assert!(response.advanced);
            assert_eq!(response.lead.status, expected);
            assert!(response.message.is_none());
            current = response.lead;
        }

        let response = AdvanceLeadResponse::step(current).with_notice(notice);
        assert!(!response.advanced);
        assert_eq!(response.lead.status, LeadStatus::Matriculado);
        assert_eq!(response.message.as_deref(), Some("Este lead já está matriculado."));
    }

    #[test]
    fn serializes_with_display_labels() {
        for status in LeadStatus::FUNNEL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::json!(status.label()));
        }
        let parsed: LeadStatus = serde_json::from_value(serde_json::json!("Aula Experimental")).unwrap();
        assert_eq!(parsed, LeadStatus::AulaExperimental);
    }
}
