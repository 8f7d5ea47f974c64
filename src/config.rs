// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AttendanceRepository, ClassRepository, CrmRepository, DashboardRepository, NotificationRepository,
        PhotoRepository, SettingsRepository, StudentRepository, TenantRepository, UserRepository,
    },
    services::{
        AttendanceService, AuthService, ClassService, CrmService, DashboardService, NotificationService,
        PhotoService, StudentService, TenantResolver, TenantService,
    },
    storage::{LocalObjectStore, ObjectStore, UrlSigner},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SAAS_DOMAINS: &str = "localhost,127.0.0.1,grandsalto.com.br,www.grandsalto.com.br";
const DEFAULT_STORAGE_ROOT: &str = "./storage";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_DOWNLOAD_TTL_HOURS: i64 = 168;
const DEFAULT_SIGNED_URL_TTL_SECS: i64 = 600;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub storage_signing_key: String,
    pub bind_addr: String,
    pub saas_domains: Vec<String>,
    pub storage_root: String,
    pub public_base_url: String,
    pub download_ttl_hours: i64,
    pub signed_url_ttl_secs: i64,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional_number(name: &str, default: i64) -> anyhow::Result<i64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} precisa ser um número inteiro", name)),
        Err(_) => Ok(default),
    }
}

pub fn parse_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            storage_signing_key: required("STORAGE_SIGNING_KEY")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            saas_domains: parse_domains(
                &env::var("SAAS_DOMAINS").unwrap_or_else(|_| DEFAULT_SAAS_DOMAINS.to_string()),
            ),
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()),
            download_ttl_hours: optional_number("DOWNLOAD_TTL_HOURS", DEFAULT_DOWNLOAD_TTL_HOURS)?,
            signed_url_ttl_secs: optional_number("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub student_service: StudentService,
    pub class_service: ClassService,
    pub attendance_service: AttendanceService,
    pub crm_service: CrmService,
    pub photo_service: PhotoService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Conecta ao banco, roda as migrações e monta os serviços.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Self::from_parts(config, db_pool)
    }

    /// Monta o grafo de dependências sobre um pool já criado (os testes usam um pool lazy).
    pub fn from_parts(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let url_signer = UrlSigner::new(
            config.storage_signing_key.as_bytes(),
            &config.public_base_url,
            chrono::Duration::seconds(config.signed_url_ttl_secs),
        )?;
        let object_store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(&config.storage_root));

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let student_repo = StudentRepository::new(db_pool.clone());
        let class_repo = ClassRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let crm_repo = CrmRepository::new(db_pool.clone());
        let photo_repo = PhotoRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo.clone(),
            tenant_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let tenant_service = TenantService::new(
            tenant_repo,
            settings_repo,
            user_repo.clone(),
            TenantResolver::new(&config.saas_domains),
            db_pool.clone(),
        );
        let student_service = StudentService::new(student_repo.clone(), attendance_repo.clone(), db_pool.clone());
        let class_service = ClassService::new(class_repo.clone(), student_repo, user_repo.clone(), db_pool.clone());
        let attendance_service = AttendanceService::new(attendance_repo, class_repo, db_pool.clone());
        let crm_service = CrmService::new(crm_repo, db_pool.clone());
        let photo_service = PhotoService::new(
            photo_repo,
            object_store,
            url_signer,
            chrono::Duration::hours(config.download_ttl_hours),
            db_pool.clone(),
        );
        let notification_service = NotificationService::new(notification_repo.clone(), user_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, notification_repo);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            tenant_service,
            student_service,
            class_service,
            attendance_service,
            crm_service,
            photo_service,
            notification_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_are_trimmed_and_lowercased() {
        assert_eq!(
            parse_domains(" Localhost , grandsalto.com.br,, "),
            vec!["localhost".to_string(), "grandsalto.com.br".to_string()]
        );
    }
}
