// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, NotificationRepository},
    models::{auth::Profile, dashboard::DashboardSummary},
    services::crm_service::complete_funnel,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    notification_repo: NotificationRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, notification_repo: NotificationRepository) -> Self {
        Self { repo, notification_repo }
    }

    pub async fn get_summary(&self, viewer: &Profile, tenant_id: Uuid) -> Result<DashboardSummary, AppError> {
        let (counters, funnel) = self.repo.get_counters(tenant_id).await?;
        let unread_notifications = self.notification_repo.unread_count(tenant_id, viewer).await?;

        Ok(DashboardSummary {
            active_students: counters.active_students,
            active_classes: counters.active_classes,
            // Sem turmas ativas a média é zero
            average_occupancy: counters
                .average_occupancy
                .map(|avg| (avg * 10.0).round() / 10.0)
                .unwrap_or(0.0),
            open_leads: counters.open_leads,
            leads_by_status: complete_funnel(funnel),
            pending_orders: counters.pending_orders,
            revenue_this_month: counters.revenue_this_month,
            unread_notifications,
        })
    }
}
