// src/models/billing.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::tenancy::{BillingStatus, Tenant};

// Visão de cobrança da escola (a plataforma não processa pagamentos)
#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingOverview {
    #[schema(example = "profissional")]
    pub plan: String,
    pub status: BillingStatus,
    #[schema(example = "199.90")]
    pub monthly_fee: Decimal,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    // Negativo quando já venceu
    pub days_until_due: Option<i64>,
    pub is_overdue: bool,
}

impl BillingOverview {
    pub fn from_tenant(tenant: &Tenant, today: NaiveDate) -> Self {
        let days_until_due = tenant
            .billing_due_date
            .map(|due| (due - today).num_days());

        // Trial e cancelado não ficam "em atraso"; inadimplente sempre está
        let is_overdue = match tenant.billing_status {
            BillingStatus::Inadimplente => true,
            BillingStatus::Ativo => days_until_due.is_some_and(|d| d < 0),
            BillingStatus::Trial | BillingStatus::Cancelado => false,
        };

        Self {
            plan: tenant.plan.clone(),
            status: tenant.billing_status,
            monthly_fee: tenant.monthly_fee,
            due_date: tenant.billing_due_date,
            days_until_due,
            is_overdue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn tenant(status: BillingStatus, due: Option<NaiveDate>) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Espaço Revelle".into(),
            slug: "espaco-revelle".into(),
            custom_domain: None,
            primary_color: "#7C3AED".into(),
            secondary_color: "#F59E0B".into(),
            logo_url: None,
            plan: "basico".into(),
            billing_status: status,
            billing_due_date: due,
            monthly_fee: Decimal::new(19990, 2),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn active_and_past_due_is_overdue() {
        let view = BillingOverview::from_tenant(
            &tenant(BillingStatus::Ativo, Some(date(2026, 10, 10))),
            date(2026, 10, 16),
        );
        assert_eq!(view.days_until_due, Some(-6));
        assert!(view.is_overdue);
    }

    #[test]
    fn active_and_upcoming_is_fine() {
        let view = BillingOverview::from_tenant(
            &tenant(BillingStatus::Ativo, Some(date(2026, 11, 10))),
            date(2026, 10, 16),
        );
        assert_eq!(view.days_until_due, Some(25));
        assert!(!view.is_overdue);
    }

    #[test]
    fn trial_without_due_date() {
        let view = BillingOverview::from_tenant(&tenant(BillingStatus::Trial, None), date(2026, 10, 16));
        assert_eq!(view.days_until_due, None);
        assert!(!view.is_overdue);
    }

    #[test]
    fn delinquent_is_always_overdue() {
        let view = BillingOverview::from_tenant(
            &tenant(BillingStatus::Inadimplente, Some(date(2026, 12, 1))),
            date(2026, 10, 16),
        );
        assert!(view.is_overdue);
    }
}
