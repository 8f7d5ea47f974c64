// src/models/auth.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, FromRow, Postgres, Type,
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Papéis
// ---

/// Papel do perfil. O conjunto é fechado; qualquer outro valor vindo do banco
/// é preservado em `Unknown` em vez de ser descartado.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    Diretora,
    Professor,
    Monitor,
    Estudante,
    Responsavel,
    Unknown(String),
}

impl Role {
    pub const KNOWN: &'static [Role] = &[
        Role::SuperAdmin,
        Role::Diretora,
        Role::Professor,
        Role::Monitor,
        Role::Estudante,
        Role::Responsavel,
    ];

    pub fn parse(raw: &str) -> Role {
        match raw.trim() {
            "super_admin" => Role::SuperAdmin,
            "diretora" => Role::Diretora,
            "professor" => Role::Professor,
            "monitor" => Role::Monitor,
            "estudante" => Role::Estudante,
            "responsavel" => Role::Responsavel,
            other => Role::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Diretora => "diretora",
            Role::Professor => "professor",
            Role::Monitor => "monitor",
            Role::Estudante => "estudante",
            Role::Responsavel => "responsavel",
            Role::Unknown(raw) => raw,
        }
    }

    /// Rota do painel após o login. Papéis desconhecidos caem no painel da direção.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "/admin",
            Role::Diretora => "/diretora",
            Role::Professor => "/professor",
            Role::Monitor => "/monitor",
            Role::Estudante => "/estudante",
            Role::Responsavel => "/responsavel",
            Role::Unknown(_) => "/diretora",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown(_))
    }

    /// Equipe pedagógica/administrativa da escola
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Diretora | Role::Professor | Role::Monitor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}

// A coluna `profiles.role` é TEXT
impl Type<Postgres> for Role {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        Ok(Role::parse(raw))
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

// ---
// Identidade e perfil
// ---

// Linha da tabela `users` (a identidade, com a senha)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Perfil = users + profiles
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    #[schema(example = "diretora@espacorevelle.com.br")]
    pub email: String,
    #[schema(example = "Ana Paula Souza")]
    pub full_name: String,
    #[schema(value_type = String, example = "diretora")]
    pub role: Role,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "diretora@espacorevelle.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Cadastro público: cria a escola e a conta da diretora
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[validate(length(min = 2, message = "O nome da escola deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Espaço Revelle")]
    pub school_name: String,
    #[validate(custom(function = "crate::models::tenancy::validate_slug"))]
    #[schema(example = "espaco-revelle")]
    pub slug: String,
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Ana Paula Souza")]
    pub full_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 2, message = "required"))]
    pub full_name: String,
    #[schema(value_type = String, example = "professor")]
    pub role: Role,
    pub phone: Option<String>,
    // Só o super_admin escolhe a escola; os demais usam a própria
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, message = "required"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, example = "monitor")]
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

// Resposta de autenticação com o token e o destino do painel
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[schema(value_type = String, example = "diretora")]
    pub role: Role,
    #[schema(example = "/diretora")]
    pub redirect_to: String,
    pub tenant_id: Option<Uuid>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_role_has_its_own_dashboard() {
        let paths: Vec<_> = Role::KNOWN.iter().map(Role::dashboard_path).collect();
        assert_eq!(
            paths,
            vec!["/admin", "/diretora", "/professor", "/monitor", "/estudante", "/responsavel"]
        );
    }

    #[test]
    fn unknown_roles_go_to_the_director_dashboard() {
        for raw in ["secretaria", "", "DIRETORA", "admin"] {
            let role = Role::parse(raw);
            assert!(!role.is_known(), "{raw:?} não deveria ser conhecido");
            assert_eq!(role.dashboard_path(), "/diretora");
        }
    }

    #[test]
    fn parse_round_trips_known_roles() {
        for role in Role::KNOWN {
            assert_eq!(&Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn unknown_role_keeps_its_raw_value() {
        let role: Role = serde_json::from_value(serde_json::json!("secretaria")).unwrap();
        assert_eq!(role, Role::Unknown("secretaria".into()));
        assert_eq!(serde_json::to_value(&role).unwrap(), serde_json::json!("secretaria"));
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Professor.is_staff());
        assert!(Role::Monitor.is_staff());
        assert!(!Role::Responsavel.is_staff());
        assert!(!Role::SuperAdmin.is_staff());
    }
}
