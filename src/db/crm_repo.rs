// src/db/crm_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{CreateLeadPayload, FunnelStage, Lead, LeadStatus, UpdateLeadPayload},
};

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_lead<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateLeadPayload,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Todo lead entra no início do funil
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (tenant_id, name, phone, email, interest, source, notes, trial_class_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'novo')
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(payload.phone.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.interest.as_deref())
        .bind(payload.source.as_deref())
        .bind(payload.notes.as_deref())
        .bind(payload.trial_class_at)
        .fetch_one(executor)
        .await?;

        Ok(lead)
    }

    pub async fn list_leads(&self, tenant_id: Uuid, status: Option<LeadStatus>) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE tenant_id = $1
              AND ($2::lead_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn find_lead<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(lead)
    }

    // Trava o lead para a transição de status
    pub async fn lock_lead<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn update_lead<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateLeadPayload,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O status não muda por aqui
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                interest = COALESCE($6, interest),
                source = COALESCE($7, source),
                notes = COALESCE($8, notes),
                trial_class_at = COALESCE($9, trial_class_at),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.name.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.interest.as_deref())
        .bind(payload.source.as_deref())
        .bind(payload.notes.as_deref())
        .bind(payload.trial_class_at)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("lead_not_found"))?;

        Ok(lead)
    }

    pub async fn delete_lead<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Contagem por etapa. Etapas vazias não aparecem aqui; o serviço completa.
    pub async fn funnel_counts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<FunnelStage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stages = sqlx::query_as::<_, FunnelStage>(
            r#"
            SELECT status, COUNT(*) AS total
            FROM leads
            WHERE tenant_id = $1
            GROUP BY status
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(stages)
    }
}
