// src/db/tenancy_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{BillingStatus, Tenant, TenantOverview, UpdateBillingPayload, UpdateTenantPayload},
};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

// Traduz violações de unicidade da tabela `tenants`
fn map_tenant_unique(e: sqlx::Error, slug: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    "tenants_slug_key" => AppError::SlugAlreadyExists(slug.to_string()),
                    _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                };
            }
        }
    }
    e.into()
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = LOWER($1)")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }

    pub async fn find_by_custom_domain(&self, domain: &str) -> Result<Option<Tenant>, AppError> {
        let tenant =
            sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE custom_domain = LOWER($1)")
                .bind(domain)
                .fetch_optional(&self.pool)
                .await?;

        Ok(tenant)
    }

    /// Cria a escola. Slug repetido vira `SlugAlreadyExists`.
    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
        plan: &str,
        monthly_fee: Decimal,
        custom_domain: Option<&str>,
        billing_status: BillingStatus,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, plan, monthly_fee, custom_domain, billing_status)
            VALUES ($1, LOWER($2), $3, $4, LOWER($5), $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(plan)
        .bind(monthly_fee)
        .bind(custom_domain)
        .bind(billing_status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_tenant_unique(e, slug))
    }

    // Provisionamento idempotente: busca pelo slug ou cria
    pub async fn ensure_tenant<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug)
            VALUES ($1, LOWER($2))
            ON CONFLICT (slug) DO UPDATE SET updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }

    pub async fn update_tenant<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateTenantPayload,
    ) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants SET
                name = COALESCE($2, name),
                plan = COALESCE($3, plan),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.plan.as_deref())
        .bind(payload.is_active)
        .fetch_optional(executor)
        .await?;

        Ok(tenant)
    }

    pub async fn update_billing<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateBillingPayload,
    ) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O vencimento é substituído (pode ser limpo); o resto só se informado
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants SET
                billing_status = $2,
                billing_due_date = $3,
                monthly_fee = COALESCE($4, monthly_fee),
                plan = COALESCE($5, plan),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.billing_status)
        .bind(payload.billing_due_date)
        .bind(payload.monthly_fee)
        .bind(payload.plan.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(tenant)
    }

    /// Lista do super admin: todas as escolas com contadores.
    pub async fn list_overview(&self) -> Result<Vec<TenantOverview>, AppError> {
        let tenants = sqlx::query_as::<_, TenantOverview>(
            r#"
            SELECT t.*,
                (SELECT COUNT(*) FROM students s
                  WHERE s.tenant_id = t.id AND s.status = 'ativo') AS active_students,
                (SELECT COUNT(*) FROM profiles p
                  WHERE p.tenant_id = t.id
                    AND p.role IN ('diretora', 'professor', 'monitor')) AS staff_count
            FROM tenants t
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }
}
