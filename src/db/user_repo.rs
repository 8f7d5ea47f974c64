// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Profile, Role, User},
};

// Identidades (users) e perfis por escola (profiles)
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profile_view WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    // Perfil dentro de uma escola específica
    pub async fn find_profile_in_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profile_view WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(profile)
    }

    pub async fn list_profiles<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        role: Option<&Role>,
    ) -> Result<Vec<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profile_view
            WHERE tenant_id = $1
              AND ($2::TEXT IS NULL OR role = $2)
            ORDER BY full_name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(role.map(|r| r.as_str().to_string()))
        .fetch_all(executor)
        .await?;

        Ok(profiles)
    }

    // Cria a identidade. E-mail duplicado vira EmailAlreadyExists.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (LOWER($1), $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            "users_email_key" => AppError::EmailAlreadyExists,
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    // Usado pelo provisionamento: cria ou atualiza a senha
    pub async fn upsert_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (LOWER($1), $2)
            ON CONFLICT (email) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    updated_at = NOW()
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(executor)
            .await?;

        Ok(())
    }

    // Insere (ou atualiza) o perfil e devolve o registro da view
    pub async fn upsert_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        full_name: &str,
        role: &Role,
        phone: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            WITH saved AS (
                INSERT INTO profiles (id, tenant_id, full_name, role, phone)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                    SET tenant_id = EXCLUDED.tenant_id,
                        full_name = EXCLUDED.full_name,
                        role = EXCLUDED.role,
                        phone = EXCLUDED.phone,
                        is_active = TRUE,
                        updated_at = NOW()
                RETURNING *
            )
            SELECT s.id, s.tenant_id, u.email, s.full_name, s.role, s.phone,
                   s.is_active, s.created_at, s.updated_at
            FROM saved s
            JOIN users u ON u.id = s.id
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(full_name)
        .bind(role)
        .bind(phone)
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        full_name: Option<&str>,
        phone: Option<&str>,
        role: Option<&Role>,
        is_active: Option<bool>,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            WITH saved AS (
                UPDATE profiles SET
                    full_name = COALESCE($3, full_name),
                    phone = COALESCE($4, phone),
                    role = COALESCE($5, role),
                    is_active = COALESCE($6, is_active),
                    updated_at = NOW()
                WHERE id = $1 AND tenant_id = $2
                RETURNING *
            )
            SELECT s.id, s.tenant_id, u.email, s.full_name, s.role, s.phone,
                   s.is_active, s.created_at, s.updated_at
            FROM saved s
            JOIN users u ON u.id = s.id
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(full_name)
        .bind(phone)
        .bind(role.map(|r| r.as_str().to_string()))
        .bind(is_active)
        .fetch_optional(executor)
        .await?;

        Ok(profile)
    }
}
