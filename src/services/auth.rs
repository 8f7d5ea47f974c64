// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenantRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, CreateUserPayload, Profile, Role, SignupPayload, UpdateUserPayload},
        tenancy::{BillingStatus, Tenant},
    },
};

// Plano de quem se cadastra sozinho
const SIGNUP_PLAN: &str = "basico";

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    jwt_secret: String,
    pool: PgPool,
}

/// Papéis que a diretora pode criar na própria escola.
pub fn director_can_assign(role: &Role) -> bool {
    matches!(
        role,
        Role::Professor | Role::Monitor | Role::Estudante | Role::Responsavel
    )
}

/// Ninguém rebaixa nem desativa o próprio perfil.
pub fn ensure_not_own_access_change(
    caller: &Profile,
    target_id: Uuid,
    payload: &UpdateUserPayload,
) -> Result<(), AppError> {
    if caller.id != target_id {
        return Ok(());
    }

    let changes_role = payload.role.as_ref().is_some_and(|role| *role != caller.role);
    let deactivates = payload.is_active == Some(false);
    if changes_role || deactivates {
        return Err(AppError::OwnAccessChange);
    }

    Ok(())
}

/// Escola desativada derruba o acesso de todos os perfis dela.
pub fn ensure_tenant_active(tenant: Option<&Tenant>) -> Result<(), AppError> {
    match tenant {
        None => Err(AppError::NotFound("tenant_not_found")),
        Some(tenant) if !tenant.is_active => Err(AppError::TenantInactive),
        Some(_) => Ok(()),
    }
}

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tenant_repo: TenantRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, tenant_repo, jwt_secret, pool }
    }

    /// Login: confere a senha, carrega o perfil e decide o painel de destino.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Autenticou mas não tem perfil: precisa falar com o administrador
        let profile = self
            .user_repo
            .find_profile(user.id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if !profile.is_active {
            return Err(AppError::ProfileInactive);
        }

        self.check_profile_tenant(&profile).await?;

        if let Role::Unknown(raw) = &profile.role {
            tracing::warn!(
                "Papel desconhecido '{}' no perfil {}; redirecionando para o painel da diretora",
                raw,
                profile.id
            );
        }

        let token = self.create_token(user.id)?;

        Ok(AuthResponse {
            token,
            redirect_to: profile.role.dashboard_path().to_string(),
            role: profile.role,
            tenant_id: profile.tenant_id,
        })
    }

    /// Cadastro self-service: escola em trial + diretora, tudo ou nada.
    pub async fn signup(&self, payload: &SignupPayload) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenant_repo
            .create_tenant(
                &mut *tx,
                &payload.school_name,
                &payload.slug,
                SIGNUP_PLAN,
                Decimal::ZERO,
                None,
                BillingStatus::Trial,
            )
            .await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password)
            .await?;

        let profile = self
            .user_repo
            .upsert_profile(&mut *tx, user.id, Some(tenant.id), &payload.full_name, &Role::Diretora, None)
            .await?;

        tx.commit().await?;

        tracing::info!("🎉 Nova escola cadastrada: {} ({})", tenant.name, tenant.slug);

        Ok(AuthResponse {
            token: self.create_token(user.id)?,
            redirect_to: profile.role.dashboard_path().to_string(),
            role: profile.role,
            tenant_id: profile.tenant_id,
        })
    }

    /// Criação de usuário pela administração. A diretora só cria na própria
    /// escola e só papéis operacionais; o super admin cria qualquer papel.
    pub async fn create_user(&self, caller: &Profile, payload: &CreateUserPayload) -> Result<Profile, AppError> {
        let tenant_id = match caller.role {
            Role::SuperAdmin => {
                if !payload.role.is_known() {
                    return Err(AppError::RoleNotAssignable);
                }
                if payload.role == Role::SuperAdmin {
                    None
                } else {
                    Some(payload.tenant_id.ok_or(AppError::TenantRequired)?)
                }
            }
            Role::Diretora => {
                if !director_can_assign(&payload.role) {
                    return Err(AppError::RoleNotAssignable);
                }
                caller.tenant_id
            }
            _ => return Err(AppError::Forbidden),
        };

        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password)
            .await?;

        let profile = self
            .user_repo
            .upsert_profile(
                &mut *tx,
                user.id,
                tenant_id,
                &payload.full_name,
                &payload.role,
                payload.phone.as_deref(),
            )
            .await?;

        tx.commit().await?;

        Ok(profile)
    }

    pub async fn update_user(
        &self,
        caller: &Profile,
        tenant_id: Uuid,
        user_id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<Profile, AppError> {
        ensure_not_own_access_change(caller, user_id, payload)?;

        if let Some(role) = &payload.role {
            let allowed = match caller.role {
                Role::SuperAdmin => role.is_known() && *role != Role::SuperAdmin,
                _ => director_can_assign(role),
            };
            if !allowed {
                return Err(AppError::RoleNotAssignable);
            }
        }

        let hashed_password = match &payload.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let target = self
            .user_repo
            .find_profile_in_tenant(&mut *tx, tenant_id, user_id)
            .await?
            .ok_or(AppError::NotFound("user_not_found"))?;

        // A diretora não mexe em outra diretora
        if caller.role != Role::SuperAdmin && target.role == Role::Diretora && target.id != caller.id {
            return Err(AppError::Forbidden);
        }

        let profile = self
            .user_repo
            .update_profile(
                &mut *tx,
                tenant_id,
                user_id,
                payload.full_name.as_deref(),
                payload.phone.as_deref(),
                payload.role.as_ref(),
                payload.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("user_not_found"))?;

        if let Some(hashed) = hashed_password {
            self.user_repo.update_password(&mut *tx, user_id, &hashed).await?;
        }

        tx.commit().await?;

        Ok(profile)
    }

    pub async fn list_users<'e, E>(&self, executor: E, tenant_id: Uuid, role: Option<&Role>) -> Result<Vec<Profile>, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        self.user_repo.list_profiles(executor, tenant_id, role).await
    }

    /// Valida o JWT e devolve o perfil do dono do token.
    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let profile = self
            .user_repo
            .find_profile(token_data.claims.sub)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if !profile.is_active {
            return Err(AppError::ProfileInactive);
        }

        // Tokens emitidos antes da desativação da escola também caem aqui
        self.check_profile_tenant(&profile).await?;

        Ok(profile)
    }

    // super_admin não tem escola própria
    async fn check_profile_tenant(&self, profile: &Profile) -> Result<(), AppError> {
        let Some(tenant_id) = profile.tenant_id else {
            return Ok(());
        };
        let tenant = self.tenant_repo.find_by_id(tenant_id).await?;
        ensure_tenant_active(tenant.as_ref())
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn director_assigns_only_operational_roles() {
        assert!(director_can_assign(&Role::Professor));
        assert!(director_can_assign(&Role::Monitor));
        assert!(director_can_assign(&Role::Estudante));
        assert!(director_can_assign(&Role::Responsavel));
        assert!(!director_can_assign(&Role::Diretora));
        assert!(!director_can_assign(&Role::SuperAdmin));
        assert!(!director_can_assign(&Role::Unknown("secretaria".into())));
    }

    fn profile(role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            tenant_id: Some(Uuid::new_v4()),
            email: "diretora@espacorevelle.com.br".into(),
            full_name: "Ana Paula Souza".into(),
            role,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn update(role: Option<Role>, is_active: Option<bool>) -> UpdateUserPayload {
        UpdateUserPayload {
            full_name: None,
            phone: None,
            role,
            is_active,
            password: None,
        }
    }

    fn tenant(is_active: bool) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Espaço Revelle".into(),
            slug: "espaco-revelle".into(),
            custom_domain: None,
            primary_color: "#7C3AED".into(),
            secondary_color: "#F59E0B".into(),
            logo_url: None,
            plan: "basico".into(),
            billing_status: BillingStatus::Ativo,
            billing_due_date: None,
            monthly_fee: Decimal::ZERO,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn deactivated_school_blocks_its_profiles() {
        assert!(ensure_tenant_active(Some(&tenant(true))).is_ok());
        assert!(matches!(
            ensure_tenant_active(Some(&tenant(false))),
            Err(AppError::TenantInactive)
        ));
        assert!(matches!(
            ensure_tenant_active(None),
            Err(AppError::NotFound("tenant_not_found"))
        ));
    }

    #[test]
    fn director_cannot_demote_or_deactivate_own_profile() {
        let director = profile(Role::Diretora);

        assert!(matches!(
            ensure_not_own_access_change(&director, director.id, &update(Some(Role::Monitor), None)),
            Err(AppError::OwnAccessChange)
        ));
        assert!(matches!(
            ensure_not_own_access_change(&director, director.id, &update(None, Some(false))),
            Err(AppError::OwnAccessChange)
        ));
    }

    #[test]
    fn own_profile_edits_that_keep_access_are_allowed() {
        let director = profile(Role::Diretora);

        assert!(ensure_not_own_access_change(&director, director.id, &update(None, None)).is_ok());
        assert!(
            ensure_not_own_access_change(&director, director.id, &update(Some(Role::Diretora), Some(true)))
                .is_ok()
        );
        // Em outro perfil a regra não se aplica
        assert!(
            ensure_not_own_access_change(&director, Uuid::new_v4(), &update(Some(Role::Monitor), Some(false)))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("senha-forte").await.unwrap();
        assert!(verify("senha-forte", &hashed).unwrap());
        assert!(!verify("outra", &hashed).unwrap());
    }
}
