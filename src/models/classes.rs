// src/models/classes.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{students::StudentStatus, tenancy::validate_hex_color};

// ---
// 1. Turma
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DanceClass {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Ballet Baby - Sábado")]
    pub name: String,
    #[schema(example = "Ballet Clássico")]
    pub style: Option<String>,
    #[schema(example = "Iniciante")]
    pub level: Option<String>,
    #[schema(example = 15)]
    pub capacity: i32,
    #[schema(example = "#EC4899")]
    pub color: String,
    pub teacher_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ocupação da turma. Sempre calculada a partir das matrículas ativas.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    pub active_enrollments: i64,
    pub capacity: i32,
    // Percentual 0..=100 (pode passar de 100 se a capacidade for reduzida depois)
    pub fill_rate: f64,
    pub available_spots: i64,
    pub is_full: bool,
}

impl Occupancy {
    pub fn compute(active_enrollments: i64, capacity: i32) -> Self {
        let capacity_i64 = i64::from(capacity.max(0));
        let fill_rate = if capacity_i64 == 0 {
            0.0
        } else {
            let raw = active_enrollments as f64 * 100.0 / capacity_i64 as f64;
            (raw * 10.0).round() / 10.0
        };

        Self {
            active_enrollments,
            capacity,
            fill_rate,
            available_spots: (capacity_i64 - active_enrollments).max(0),
            is_full: active_enrollments >= capacity_i64,
        }
    }
}

// Linha da listagem: turma + contagem viva de matrículas ativas
#[derive(Debug, Clone, FromRow)]
pub struct ClassWithCount {
    #[sqlx(flatten)]
    pub class: DanceClass,
    pub teacher_name: Option<String>,
    pub active_enrollments: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    #[serde(flatten)]
    pub class: DanceClass,
    pub teacher_name: Option<String>,
    pub occupancy: Occupancy,
}

impl From<ClassWithCount> for ClassSummary {
    fn from(row: ClassWithCount) -> Self {
        let occupancy = Occupancy::compute(row.active_enrollments, row.class.capacity);
        Self {
            class: row.class,
            teacher_name: row.teacher_name,
            occupancy,
        }
    }
}

// ---
// 2. Agenda (agenda_aula)
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchedule {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub class_id: Uuid,
    // 0 = domingo ... 6 = sábado
    #[schema(example = 6)]
    pub weekday: i16,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:00:00")]
    pub end_time: NaiveTime,
    #[schema(example = "Sala 1")]
    pub room: Option<String>,
}

// ---
// 3. Matrícula
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Ativa,
    Cancelada,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

// Aluna matriculada (para a lista da turma e a chamada)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub full_name: String,
    pub student_status: StudentStatus,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    #[serde(flatten)]
    pub summary: ClassSummary,
    pub schedules: Vec<ClassSchedule>,
    pub roster: Vec<RosterEntry>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassPayload {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Jazz Teen")]
    pub name: String,
    pub style: Option<String>,
    pub level: Option<String>,
    #[validate(range(min = 1, max = 500, message = "invalid_capacity"))]
    #[schema(example = 20)]
    pub capacity: i32,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassPayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: Option<String>,
    pub style: Option<String>,
    pub level: Option<String>,
    #[validate(range(min = 1, max = 500, message = "invalid_capacity"))]
    pub capacity: Option<i32>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_schedule_window"))]
pub struct AddSchedulePayload {
    #[validate(range(min = 0, max = 6, message = "invalid_weekday"))]
    pub weekday: i16,
    #[schema(value_type = String, example = "18:30:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:30:00")]
    pub end_time: NaiveTime,
    pub room: Option<String>,
}

fn validate_schedule_window(payload: &AddSchedulePayload) -> Result<(), ValidationError> {
    if payload.end_time > payload.start_time {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_time_window");
        err.message = Some("O horário final deve ser depois do inicial.".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload {
    pub student_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn occupancy_is_derived_from_active_enrollments() {
        let occ = Occupancy::compute(12, 15);
        assert_eq!(occ.fill_rate, 80.0);
        assert_eq!(occ.available_spots, 3);
        assert!(!occ.is_full);
    }

    #[test]
    fn full_class() {
        let occ = Occupancy::compute(15, 15);
        assert!(occ.is_full);
        assert_eq!(occ.available_spots, 0);
        assert_eq!(occ.fill_rate, 100.0);
    }

    #[test]
    fn shrunk_capacity_overflows_without_negative_spots() {
        let occ = Occupancy::compute(12, 10);
        assert!(occ.is_full);
        assert_eq!(occ.available_spots, 0);
        assert_eq!(occ.fill_rate, 120.0);
    }

    #[test]
    fn rate_is_rounded_to_one_decimal() {
        assert_eq!(Occupancy::compute(1, 3).fill_rate, 33.3);
        assert_eq!(Occupancy::compute(2, 3).fill_rate, 66.7);
    }

    #[test]
    fn schedule_must_end_after_it_starts() {
        let payload = AddSchedulePayload {
            weekday: 2,
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            room: None,
        };
        assert!(payload.validate().is_err());
    }
}
