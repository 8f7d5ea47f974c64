// src/services/notification_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::{
        auth::Profile,
        notifications::{CreateNotificationPayload, Notification},
    },
};

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    /// Sem destinatário nem papel, vai para a escola inteira.
    pub async fn create(&self, author: &Profile, tenant_id: Uuid, payload: &CreateNotificationPayload) -> Result<Notification, AppError> {
        if let Some(recipient_id) = payload.recipient_id {
            self.user_repo
                .find_profile_in_tenant(&self.pool, tenant_id, recipient_id)
                .await?
                .ok_or(AppError::NotFound("user_not_found"))?;
        }

        self.repo
            .create(
                &self.pool,
                tenant_id,
                payload.recipient_id,
                payload.target_role.as_ref(),
                &payload.title,
                &payload.body,
                author.id,
            )
            .await
    }

    pub async fn list_mine(&self, profile: &Profile, tenant_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_profile(tenant_id, profile).await
    }

    pub async fn unread_count(&self, profile: &Profile, tenant_id: Uuid) -> Result<i64, AppError> {
        self.repo.unread_count(tenant_id, profile).await
    }

    pub async fn mark_read(&self, profile: &Profile, tenant_id: Uuid, notification_id: Uuid) -> Result<(), AppError> {
        if self.repo.mark_read(tenant_id, profile, notification_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("notification_not_found"))
        }
    }
}
