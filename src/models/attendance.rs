// src/models/attendance.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::{Profile, Role}, classes::DanceClass};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-10-10")]
    pub lesson_date: NaiveDate,
    pub present: bool,
    pub note: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

// Linha da chamada do dia: toda aluna ativa, marcada ou não
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheetEntry {
    pub student_id: Uuid,
    pub full_name: String,
    // None = ainda não registrado
    pub present: Option<bool>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub class_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub lesson_date: NaiveDate,
    pub entries: Vec<AttendanceSheetEntry>,
}

// Histórico de presença de uma aluna
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceEntry {
    pub class_id: Uuid,
    pub class_name: String,
    #[schema(value_type = String, format = Date)]
    pub lesson_date: NaiveDate,
    pub present: bool,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceHistory {
    pub student_id: Uuid,
    pub total_lessons: usize,
    pub presences: usize,
    // Percentual 0..=100; None quando ainda não há aulas registradas
    pub attendance_rate: Option<f64>,
    pub entries: Vec<StudentAttendanceEntry>,
}

impl StudentAttendanceHistory {
    pub fn from_entries(student_id: Uuid, entries: Vec<StudentAttendanceEntry>) -> Self {
        let total_lessons = entries.len();
        let presences = entries.iter().filter(|e| e.present).count();
        let attendance_rate = (total_lessons > 0)
            .then(|| ((presences as f64 * 1000.0 / total_lessons as f64).round()) / 10.0);

        Self { student_id, total_lessons, presences, attendance_rate, entries }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntryPayload {
    pub student_id: Uuid,
    pub present: bool,
    #[validate(length(max = 500, message = "too_long"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeAttendancePayload {
    #[schema(value_type = String, format = Date, example = "2026-10-10")]
    pub lesson_date: NaiveDate,
    #[validate(length(min = 1, message = "required"), nested)]
    pub entries: Vec<AttendanceEntryPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub date: NaiveDate,
}

/// Quem pode fazer a chamada desta turma: a diretora e monitores em qualquer
/// turma da escola; a professora apenas nas turmas em que leciona.
pub fn can_take_attendance(profile: &Profile, class: &DanceClass) -> bool {
    if profile.tenant_id != Some(class.tenant_id) {
        return false;
    }
    match profile.role {
        Role::Diretora | Role::Monitor => true,
        Role::Professor => class.teacher_id == Some(profile.id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: Role, tenant_id: Uuid) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            tenant_id: Some(tenant_id),
            email: "x@escola.com".into(),
            full_name: "Fulana".into(),
            role,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn class(tenant_id: Uuid, teacher_id: Option<Uuid>) -> DanceClass {
        DanceClass {
            id: Uuid::new_v4(),
            tenant_id,
            name: "Ballet".into(),
            style: None,
            level: None,
            capacity: 10,
            color: "#7C3AED".into(),
            teacher_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn teacher_only_for_own_classes() {
        let tenant = Uuid::new_v4();
        let teacher = profile(Role::Professor, tenant);
        assert!(can_take_attendance(&teacher, &class(tenant, Some(teacher.id))));
        assert!(!can_take_attendance(&teacher, &class(tenant, Some(Uuid::new_v4()))));
        assert!(!can_take_attendance(&teacher, &class(tenant, None)));
    }

    #[test]
    fn monitor_and_director_for_any_class_of_the_school() {
        let tenant = Uuid::new_v4();
        let c = class(tenant, Some(Uuid::new_v4()));
        assert!(can_take_attendance(&profile(Role::Monitor, tenant), &c));
        assert!(can_take_attendance(&profile(Role::Diretora, tenant), &c));
        assert!(!can_take_attendance(&profile(Role::Responsavel, tenant), &c));
    }

    #[test]
    fn never_across_schools() {
        let c = class(Uuid::new_v4(), None);
        assert!(!can_take_attendance(&profile(Role::Diretora, Uuid::new_v4()), &c));
    }

    #[test]
    fn attendance_rate() {
        let entry = |present| StudentAttendanceEntry {
            class_id: Uuid::nil(),
            class_name: "Ballet".into(),
            lesson_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            present,
            note: None,
        };
        let history =
            StudentAttendanceHistory::from_entries(Uuid::nil(), vec![entry(true), entry(true), entry(false)]);
        assert_eq!(history.presences, 2);
        assert_eq!(history.attendance_rate, Some(66.7));

        let empty = StudentAttendanceHistory::from_entries(Uuid::nil(), vec![]);
        assert_eq!(empty.attendance_rate, None);
    }
}
