// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::crm::FunnelStage;

// Cards do painel da diretora
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_students: i64,
    pub active_classes: i64,
    // Média de ocupação das turmas ativas (0..=100)
    pub average_occupancy: f64,
    pub open_leads: i64,
    pub leads_by_status: Vec<FunnelStage>,
    pub pending_orders: i64,
    pub revenue_this_month: Decimal,
    pub unread_notifications: i64,
}
