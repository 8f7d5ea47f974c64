// src/db/attendance_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attendance::{AttendanceRecord, AttendanceSheetEntry, StudentAttendanceEntry},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava (ou regrava) a presença do dia. A chave é turma + estudante + data.
    pub async fn upsert_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
        student_id: Uuid,
        lesson_date: NaiveDate,
        present: bool,
        note: Option<&str>,
        recorded_by: Uuid,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records
                (tenant_id, class_id, student_id, lesson_date, present, note, recorded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (class_id, student_id, lesson_date) DO UPDATE
                SET present = EXCLUDED.present,
                    note = EXCLUDED.note,
                    recorded_by = EXCLUDED.recorded_by,
                    recorded_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .bind(student_id)
        .bind(lesson_date)
        .bind(present)
        .bind(note)
        .bind(recorded_by)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    // Folha do dia: matriculados ativos + o que já foi marcado
    pub async fn sheet(
        &self,
        tenant_id: Uuid,
        class_id: Uuid,
        lesson_date: NaiveDate,
    ) -> Result<Vec<AttendanceSheetEntry>, AppError> {
        let entries = sqlx::query_as::<_, AttendanceSheetEntry>(
            r#"
            SELECT s.id AS student_id, s.full_name, a.present, a.note
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            LEFT JOIN attendance_records a
                   ON a.class_id = e.class_id
                  AND a.student_id = e.student_id
                  AND a.lesson_date = $3
            WHERE e.tenant_id = $1 AND e.class_id = $2 AND e.status = 'ativa'
            ORDER BY s.full_name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .bind(lesson_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn student_history(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<StudentAttendanceEntry>, AppError> {
        let entries = sqlx::query_as::<_, StudentAttendanceEntry>(
            r#"
            SELECT a.class_id, c.name AS class_name, a.lesson_date, a.present, a.note
            FROM attendance_records a
            JOIN classes c ON c.id = a.class_id
            WHERE a.tenant_id = $1 AND a.student_id = $2
            ORDER BY a.lesson_date DESC, c.name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
