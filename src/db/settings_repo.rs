// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{settings::UpdateSettingsRequest, tenancy::Tenant},
};

// Identidade visual e domínio da escola (colunas de `tenants`)
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &UpdateSettingsRequest,
    ) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants SET
                name = COALESCE($2, name),
                primary_color = COALESCE($3, primary_color),
                secondary_color = COALESCE($4, secondary_color),
                logo_url = COALESCE($5, logo_url),
                custom_domain = COALESCE(LOWER($6), custom_domain),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.name.as_deref())
        .bind(payload.primary_color.as_deref())
        .bind(payload.secondary_color.as_deref())
        .bind(payload.logo_url.as_deref())
        .bind(payload.custom_domain.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return AppError::UniqueConstraintViolation(constraint.to_string());
                    }
                }
            }
            e.into()
        })
    }
}
