// src/services/crm_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{AdvanceLeadResponse, CreateLeadPayload, FunnelStage, Lead, LeadStatus, UpdateLeadPayload},
};

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    pool: PgPool,
}

/// Completa a contagem do funil com as etapas vazias, na ordem do funil.
pub fn complete_funnel(counts: Vec<FunnelStage>) -> Vec<FunnelStage> {
    LeadStatus::FUNNEL
        .iter()
        .map(|status| FunnelStage {
            status: *status,
            total: counts
                .iter()
                .find(|c| c.status == *status)
                .map(|c| c.total)
                .unwrap_or(0),
        })
        .collect()
}

impl CrmService {
    pub fn new(repo: CrmRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_lead(&self, tenant_id: Uuid, payload: &CreateLeadPayload) -> Result<Lead, AppError> {
        self.repo.create_lead(&self.pool, tenant_id, payload).await
    }

    pub async fn list_leads(&self, tenant_id: Uuid, status: Option<LeadStatus>) -> Result<Vec<Lead>, AppError> {
        self.repo.list_leads(tenant_id, status).await
    }

    pub async fn get_lead(&self, tenant_id: Uuid, id: Uuid) -> Result<Lead, AppError> {
        self.repo
            .find_lead(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("lead_not_found"))
    }

    pub async fn update_lead(&self, tenant_id: Uuid, id: Uuid, payload: &UpdateLeadPayload) -> Result<Lead, AppError> {
        self.repo
            .update_lead(&self.pool, tenant_id, id, payload)
            .await?
            .ok_or(AppError::NotFound("lead_not_found"))
    }

    pub async fn delete_lead(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_lead(&self.pool, tenant_id, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("lead_not_found"))
        }
    }

    /// Avança uma etapa no funil. Em `Matriculado` não há próxima etapa:
    /// devolve o lead intacto com `advanced = false`; a mensagem é posta pelo handler.
    pub async fn advance_lead(&self, tenant_id: Uuid, id: Uuid) -> Result<AdvanceLeadResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .repo
            .lock_lead(&mut *tx, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("lead_not_found"))?;

        let from = lead.status;
        let step = AdvanceLeadResponse::step(lead);
        if !step.advanced {
            return Ok(step);
        }

        let updated = self.repo.set_status(&mut *tx, tenant_id, id, step.lead.status).await?;
        tx.commit().await?;

        tracing::info!(
            "Lead {} avançou: {} -> {}",
            id,
            from.label(),
            updated.status.label()
        );

        Ok(AdvanceLeadResponse { lead: updated, advanced: true, message: None })
    }

    /// Ajuste manual feito pela diretora: qualquer etapa, inclusive voltar.
    pub async fn set_status(&self, tenant_id: Uuid, id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .lock_lead(&mut *tx, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("lead_not_found"))?;

        let updated = self.repo.set_status(&mut *tx, tenant_id, id, status).await?;
        tx.commit().await?;

        tracing::info!(
            "Status do lead {} ajustado manualmente: {} -> {}",
            id,
            current.status.label(),
            updated.status.label()
        );

        Ok(updated)
    }

    pub async fn funnel(&self, tenant_id: Uuid) -> Result<Vec<FunnelStage>, AppError> {
        let counts = self.repo.funnel_counts(&self.pool, tenant_id).await?;
        Ok(complete_funnel(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funnel_lists_every_stage_in_order() {
        let funnel = complete_funnel(vec![
            FunnelStage { status: LeadStatus::Matriculado, total: 2 },
            FunnelStage { status: LeadStatus::Novo, total: 5 },
        ]);

        let statuses: Vec<LeadStatus> = funnel.iter().map(|s| s.status).collect();
        assert_eq!(statuses, LeadStatus::FUNNEL.to_vec());
        let totals: Vec<i64> = funnel.iter().map(|s| s.total).collect();
        assert_eq!(totals, vec![5, 0, 0, 2]);
    }
}
