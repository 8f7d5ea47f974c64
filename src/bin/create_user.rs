// src/bin/create_user.rs
//
// Provisiona a escola demo e as cinco contas demo. Pode rodar quantas vezes
// quiser: tudo é upsert.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use grand_salto::{
    db::{SettingsRepository, StudentRepository, TenantRepository, UserRepository},
    models::{auth::Role, settings::UpdateSettingsRequest, students::CreateStudentPayload},
    services::auth::hash_password,
};

#[derive(Parser)]
#[command(name = "create-user")]
#[command(about = "Cria (ou atualiza) a escola demo e as contas demo de cada papel")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long, env = "DEMO_PASSWORD", default_value = "grandsalto123", help = "Senha de todas as contas demo")]
    password: String,

    #[arg(long, default_value = "espaco-revelle")]
    tenant_slug: String,

    #[arg(long, default_value = "Espaço Revelle")]
    tenant_name: String,

    #[arg(long, help = "Domínio próprio da escola (ex.: espacorevelle.com.br)")]
    domain: Option<String>,
}

struct DemoAccount {
    local_part: &'static str,
    full_name: &'static str,
    role: Role,
}

fn demo_accounts() -> Vec<DemoAccount> {
    vec![
        DemoAccount { local_part: "diretora", full_name: "Ana Paula Souza", role: Role::Diretora },
        DemoAccount { local_part: "professor", full_name: "Marcos Oliveira", role: Role::Professor },
        DemoAccount { local_part: "monitor", full_name: "Larissa Costa", role: Role::Monitor },
        DemoAccount { local_part: "estudante", full_name: "Beatriz Lima", role: Role::Estudante },
        DemoAccount { local_part: "responsavel", full_name: "Carla Lima", role: Role::Responsavel },
    ]
}

// "espaco-revelle" -> "espacorevelle.com.br"
fn email_domain(slug: &str, custom_domain: Option<&str>) -> String {
    match custom_domain {
        Some(domain) => domain.trim().to_lowercase(),
        None => format!("{}.com.br", slug.replace('-', "")),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&cli.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    let tenant_repo = TenantRepository::new(pool.clone());
    let settings_repo = SettingsRepository::new(pool.clone());
    let user_repo = UserRepository::new(pool.clone());
    let student_repo = StudentRepository::new(pool.clone());

    let password_hash = hash_password(&cli.password).await?;
    let domain = email_domain(&cli.tenant_slug, cli.domain.as_deref());

    let mut tx = pool.begin().await?;

    let tenant = tenant_repo
        .ensure_tenant(&mut *tx, &cli.tenant_name, &cli.tenant_slug)
        .await?;

    if let Some(custom_domain) = &cli.domain {
        let request = UpdateSettingsRequest {
            name: None,
            primary_color: None,
            secondary_color: None,
            logo_url: None,
            custom_domain: Some(custom_domain.trim().to_lowercase()),
        };
        settings_repo.update_settings(&mut *tx, tenant.id, &request).await?;
    }

    let mut student_profile = None;
    let mut guardian_profile = None;

    for account in demo_accounts() {
        let email = format!("{}@{}", account.local_part, domain);
        let user = user_repo.upsert_user(&mut *tx, &email, &password_hash).await?;
        let profile = user_repo
            .upsert_profile(&mut *tx, user.id, Some(tenant.id), account.full_name, &account.role, None)
            .await?;

        println!("  {:<12} {}", account.role.as_str(), email);

        match account.role {
            Role::Estudante => student_profile = Some(profile),
            Role::Responsavel => guardian_profile = Some(profile),
            _ => {}
        }
    }

    tx.commit().await?;

    // Ficha da aluna demo, ligada aos logins da aluna e da responsável
    if let (Some(student), Some(guardian)) = (student_profile, guardian_profile) {
        if student_repo.find_by_profile(tenant.id, student.id).await?.is_none() {
            let payload = CreateStudentPayload {
                full_name: student.full_name.clone(),
                birth_date: None,
                email: Some(student.email.clone()),
                phone: None,
                guardian_name: Some(guardian.full_name.clone()),
                guardian_phone: None,
                guardian_email: Some(guardian.email.clone()),
                profile_id: Some(student.id),
                guardian_profile_id: Some(guardian.id),
                notes: None,
            };
            student_repo.create(&pool, tenant.id, &payload).await?;
        }
    }

    println!("Escola '{}' ({}) pronta.", tenant.name, tenant.slug);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Erro: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_account_per_school_role() {
        let roles: Vec<Role> = demo_accounts().into_iter().map(|a| a.role).collect();
        assert_eq!(roles.len(), 5);
        assert!(!roles.contains(&Role::SuperAdmin));
    }

    #[test]
    fn email_domain_from_slug_or_custom_domain() {
        assert_eq!(email_domain("espaco-revelle", None), "espacorevelle.com.br");
        assert_eq!(email_domain("espaco-revelle", Some("Revelle.Dance ")), "revelle.dance");
    }
}
