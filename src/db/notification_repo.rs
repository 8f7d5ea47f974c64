// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Profile, Role},
        notifications::Notification,
    },
};

// Visível para o perfil: direcionada a ele, ao papel dele ou a todos da escola
const VISIBLE_TO_PROFILE: &str = r#"
    n.tenant_id = $1
    AND (
        n.recipient_id = $2
        OR (n.recipient_id IS NULL AND (n.target_role IS NULL OR n.target_role = $3))
    )
"#;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recipient_id: Option<Uuid>,
        target_role: Option<&Role>,
        title: &str,
        body: &str,
        created_by: Uuid,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (tenant_id, recipient_id, target_role, title, body, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *, NULL::TIMESTAMPTZ AS read_at
            "#,
        )
        .bind(tenant_id)
        .bind(recipient_id)
        .bind(target_role)
        .bind(title)
        .bind(body)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_profile(&self, tenant_id: Uuid, profile: &Profile) -> Result<Vec<Notification>, AppError> {
        let sql = format!(
            r#"
            SELECT n.*, r.read_at
            FROM notifications n
            LEFT JOIN notification_reads r
                   ON r.notification_id = n.id AND r.profile_id = $2
            WHERE {VISIBLE_TO_PROFILE}
            ORDER BY n.created_at DESC
            "#
        );

        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(tenant_id)
            .bind(profile.id)
            .bind(&profile.role)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, tenant_id: Uuid, profile: &Profile) -> Result<i64, AppError> {
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM notifications n
            WHERE {VISIBLE_TO_PROFILE}
              AND NOT EXISTS (
                  SELECT 1 FROM notification_reads r
                  WHERE r.notification_id = n.id AND r.profile_id = $2
              )
            "#
        );

        let total: i64 = sqlx::query_scalar(&sql)
            .bind(tenant_id)
            .bind(profile.id)
            .bind(&profile.role)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// Marca como lida. Retorna `false` se o perfil não enxerga a notificação.
    pub async fn mark_read(&self, tenant_id: Uuid, profile: &Profile, notification_id: Uuid) -> Result<bool, AppError> {
        let sql = format!(
            r#"
            INSERT INTO notification_reads (notification_id, profile_id)
            SELECT n.id, $2
            FROM notifications n
            WHERE n.id = $4 AND {VISIBLE_TO_PROFILE}
            ON CONFLICT (notification_id, profile_id) DO NOTHING
            "#
        );

        sqlx::query(&sql)
            .bind(tenant_id)
            .bind(profile.id)
            .bind(&profile.role)
            .bind(notification_id)
            .execute(&self.pool)
            .await?;

        // Já lida antes também conta como sucesso
        let visible: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM notifications n WHERE n.id = $4 AND {VISIBLE_TO_PROFILE})"
        ))
        .bind(tenant_id)
        .bind(profile.id)
        .bind(&profile.role)
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(visible)
    }
}
