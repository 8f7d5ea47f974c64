// src/models/students.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "student_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Ativo,
    Inativo,
    Trancado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Beatriz Lima")]
    pub full_name: String,
    #[schema(value_type = Option<String>, format = Date, example = "2015-03-12")]
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,

    // Contato do responsável
    #[schema(example = "Carla Lima")]
    pub guardian_name: Option<String>,
    #[schema(example = "(11) 98888-7777")]
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,

    pub status: StudentStatus,
    // Login da própria aluna (papel estudante), se houver
    pub profile_id: Option<Uuid>,
    // Login do responsável (papel responsavel), se houver
    pub guardian_profile_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetric {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub student_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub measured_at: NaiveDate,
    #[schema(example = "132.5")]
    pub height_cm: Option<Decimal>,
    #[schema(example = "29.80")]
    pub weight_kg: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub metrics: Vec<BodyMetric>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentPayload {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Beatriz Lima")]
    pub full_name: String,
    #[schema(value_type = Option<String>, format = Date, example = "2015-03-12")]
    pub birth_date: Option<NaiveDate>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub guardian_email: Option<String>,
    pub profile_id: Option<Uuid>,
    pub guardian_profile_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentStatusPayload {
    pub status: StudentStatus,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilter {
    pub status: Option<StudentStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBodyMetricPayload {
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub measured_at: NaiveDate,
    pub height_cm: Option<Decimal>,
    pub weight_kg: Option<Decimal>,
    pub notes: Option<String>,
}
