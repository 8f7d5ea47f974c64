// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{common::error::AppError, models::crm::FunnelStage};

// Números crus do painel; o serviço deriva o resto
#[derive(Debug, FromRow)]
pub struct DashboardCounters {
    pub active_students: i64,
    pub active_classes: i64,
    pub average_occupancy: Option<f64>,
    pub open_leads: i64,
    pub pending_orders: i64,
    pub revenue_this_month: Decimal,
}

// Precisa ser o primeiro comando da transação
const SNAPSHOT_ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_counters(&self, tenant_id: Uuid) -> Result<(DashboardCounters, Vec<FunnelStage>), AppError> {
        // Snapshot consistente dos números
        let mut tx = self.pool.begin().await?;
        sqlx::query(SNAPSHOT_ISOLATION).execute(&mut *tx).await?;

        let counters = sqlx::query_as::<_, DashboardCounters>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students
                  WHERE tenant_id = $1 AND status = 'ativo') AS active_students,
                (SELECT COUNT(*) FROM classes
                  WHERE tenant_id = $1 AND is_active) AS active_classes,
                (SELECT AVG(LEAST(o.active, c.capacity)::FLOAT8 * 100.0 / c.capacity)
                   FROM classes c
                   CROSS JOIN LATERAL (
                       SELECT COUNT(*) AS active FROM enrollments e
                       WHERE e.class_id = c.id AND e.status = 'ativa'
                   ) o
                  WHERE c.tenant_id = $1 AND c.is_active) AS average_occupancy,
                (SELECT COUNT(*) FROM leads
                  WHERE tenant_id = $1 AND status <> 'matriculado') AS open_leads,
                (SELECT COUNT(*) FROM photo_orders
                  WHERE tenant_id = $1 AND payment_status = 'pendente') AS pending_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM photo_orders
                  WHERE tenant_id = $1 AND payment_status = 'pago'
                    AND paid_at >= date_trunc('month', NOW())) AS revenue_this_month
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        let funnel = sqlx::query_as::<_, FunnelStage>(
            r#"
            SELECT status, COUNT(*) AS total
            FROM leads
            WHERE tenant_id = $1
            GROUP BY status
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((counters, funnel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_read_from_a_single_snapshot() {
        assert!(SNAPSHOT_ISOLATION.contains("REPEATABLE READ"));
        assert!(SNAPSHOT_ISOLATION.ends_with("READ ONLY"));
    }
}
