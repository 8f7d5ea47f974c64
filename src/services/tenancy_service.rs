// src/services/tenancy_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SettingsRepository, TenantRepository, UserRepository},
    models::{
        auth::Role,
        settings::UpdateSettingsRequest,
        tenancy::{
            BillingStatus, CreateTenantPayload, Tenant, TenantBranding, TenantOverview, TenantResolution,
            UpdateBillingPayload, UpdateTenantPayload,
        },
    },
    services::auth::hash_password,
};

const DEFAULT_PLAN: &str = "basico";

/// O que procurar no banco para um hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantLookup {
    // Domínio da própria plataforma: sem escola
    Platform,
    // `?escola=` explícito
    Slug(String),
    // Domínio próprio da escola, e o primeiro rótulo como slug alternativo
    Host { domain: String, slug: String },
}

/// Regra pura de resolução de escola por hostname.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    saas_domains: Vec<String>,
}

impl TenantResolver {
    pub fn new(saas_domains: &[String]) -> Self {
        Self {
            saas_domains: saas_domains.iter().map(|d| normalize_host(d)).collect(),
        }
    }

    pub fn plan(&self, host: Option<&str>, override_slug: Option<&str>) -> TenantLookup {
        // O override sempre vence, inclusive nos domínios da plataforma
        if let Some(slug) = override_slug.map(str::trim).filter(|s| !s.is_empty()) {
            return TenantLookup::Slug(slug.to_lowercase());
        }

        let host = match host.map(normalize_host).filter(|h| !h.is_empty()) {
            Some(host) => host,
            None => return TenantLookup::Platform,
        };

        if self.saas_domains.contains(&host) {
            return TenantLookup::Platform;
        }

        let slug = host.split('.').next().unwrap_or(&host).to_string();
        TenantLookup::Host { domain: host, slug }
    }
}

/// "Escola.com.br:8080" -> "escola.com.br"
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim().to_lowercase();
    // Vários proxies: vale o primeiro
    let host = host.split(',').next().unwrap_or("").trim();
    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    without_port.trim_end_matches('.').to_string()
}

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    settings_repo: SettingsRepository,
    user_repo: UserRepository,
    resolver: TenantResolver,
    pool: PgPool,
}

impl TenantService {
    pub fn new(
        tenant_repo: TenantRepository,
        settings_repo: SettingsRepository,
        user_repo: UserRepository,
        resolver: TenantResolver,
        pool: PgPool,
    ) -> Self {
        Self { tenant_repo, settings_repo, user_repo, resolver, pool }
    }

    /// Escola do hostname (ou do `?escola=`). Não achou: estado de plataforma.
    pub async fn resolve(&self, host: Option<&str>, override_slug: Option<&str>) -> Result<TenantResolution, AppError> {
        let tenant = match self.resolver.plan(host, override_slug) {
            TenantLookup::Platform => None,
            TenantLookup::Slug(slug) => self.tenant_repo.find_by_slug(&slug).await?,
            TenantLookup::Host { domain, slug } => match self.tenant_repo.find_by_custom_domain(&domain).await? {
                Some(tenant) => Some(tenant),
                None => self.tenant_repo.find_by_slug(&slug).await?,
            },
        };

        Ok(match tenant.filter(|t| t.is_active) {
            Some(tenant) => TenantResolution::Tenant { branding: TenantBranding::from(&tenant) },
            None => TenantResolution::Platform,
        })
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::NotFound("tenant_not_found"))
    }

    // ---
    // Configurações (diretora)
    // ---

    pub async fn get_settings(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.settings_repo
            .get_settings(tenant_id)
            .await?
            .ok_or(AppError::NotFound("tenant_not_found"))
    }

    pub async fn update_settings(&self, tenant_id: Uuid, payload: &UpdateSettingsRequest) -> Result<Tenant, AppError> {
        self.settings_repo
            .update_settings(&self.pool, tenant_id, payload)
            .await?
            .ok_or(AppError::NotFound("tenant_not_found"))
    }

    // ---
    // Super admin
    // ---

    pub async fn list_overview(&self) -> Result<Vec<TenantOverview>, AppError> {
        self.tenant_repo.list_overview().await
    }

    /// Cria a escola e a primeira diretora numa única transação.
    pub async fn create_tenant_with_director(&self, payload: &CreateTenantPayload) -> Result<Tenant, AppError> {
        let hashed_password = hash_password(&payload.director_password).await?;

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenant_repo
            .create_tenant(
                &mut *tx,
                &payload.name,
                &payload.slug,
                payload.plan.as_deref().unwrap_or(DEFAULT_PLAN),
                payload.monthly_fee.unwrap_or(Decimal::ZERO),
                payload.custom_domain.as_deref(),
                BillingStatus::Trial,
            )
            .await?;

        let director = self
            .user_repo
            .create_user(&mut *tx, &payload.director_email, &hashed_password)
            .await?;

        self.user_repo
            .upsert_profile(&mut *tx, director.id, Some(tenant.id), &payload.director_name, &Role::Diretora, None)
            .await?;

        tx.commit().await?;

        tracing::info!("🏫 Escola criada pelo super admin: {} ({})", tenant.name, tenant.slug);

        Ok(tenant)
    }

    pub async fn update_tenant(&self, tenant_id: Uuid, payload: &UpdateTenantPayload) -> Result<Tenant, AppError> {
        let tenant = self
            .tenant_repo
            .update_tenant(&self.pool, tenant_id, payload)
            .await?
            .ok_or(AppError::NotFound("tenant_not_found"))?;

        if payload.is_active == Some(false) {
            tracing::info!("Escola {} desativada", tenant.slug);
        }

        Ok(tenant)
    }

    pub async fn update_billing(&self, tenant_id: Uuid, payload: &UpdateBillingPayload) -> Result<Tenant, AppError> {
        self.tenant_repo
            .update_billing(&self.pool, tenant_id, payload)
            .await?
            .ok_or(AppError::NotFound("tenant_not_found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TenantResolver {
        TenantResolver::new(&[
            "localhost".to_string(),
            "127.0.0.1".to_string(),
            "grandsalto.com.br".to_string(),
            "www.grandsalto.com.br".to_string(),
        ])
    }

    #[test]
    fn host_is_normalized() {
        assert_eq!(normalize_host("Escola.COM.br:8080"), "escola.com.br");
        assert_eq!(normalize_host("localhost:3000"), "localhost");
        assert_eq!(normalize_host("revelle.com.br."), "revelle.com.br");
        assert_eq!(normalize_host("a.com, proxy.internal"), "a.com");
    }

    #[test]
    fn saas_host_is_platform() {
        let r = resolver();
        assert_eq!(r.plan(Some("grandsalto.com.br"), None), TenantLookup::Platform);
        assert_eq!(r.plan(Some("localhost:3000"), None), TenantLookup::Platform);
        assert_eq!(r.plan(None, None), TenantLookup::Platform);
        assert_eq!(r.plan(Some("WWW.GrandSalto.com.br"), None), TenantLookup::Platform);
    }

    #[test]
    fn saas_host_never_resolves_a_tenant_without_override() {
        let r = resolver();
        for host in ["localhost", "127.0.0.1:3000", "www.grandsalto.com.br"] {
            assert_eq!(r.plan(Some(host), None), TenantLookup::Platform);
            assert_eq!(r.plan(Some(host), Some("  ")), TenantLookup::Platform);
        }
    }

    #[test]
    fn override_wins_even_on_saas_host() {
        let r = resolver();
        assert_eq!(
            r.plan(Some("localhost:3000"), Some("Espaco-Revelle")),
            TenantLookup::Slug("espaco-revelle".into())
        );
    }

    #[test]
    fn foreign_host_looks_up_domain_then_first_label() {
        let r = resolver();
        assert_eq!(
            r.plan(Some("espaco-revelle.com.br"), None),
            TenantLookup::Host {
                domain: "espaco-revelle.com.br".into(),
                slug: "espaco-revelle".into()
            }
        );
    }
}
