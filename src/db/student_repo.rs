// src/db/student_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::students::{
        BodyMetric, CreateBodyMetricPayload, CreateStudentPayload, Student, StudentFilter, StudentStatus,
    },
};

#[derive(Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &StudentFilter,
    ) -> Result<Vec<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Busca por nome ignorando caixa
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE tenant_id = $1
              AND ($2::student_status IS NULL OR status = $2)
              AND ($3::TEXT IS NULL OR full_name ILIKE $3)
            ORDER BY full_name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.status)
        .bind(search)
        .fetch_all(executor)
        .await?;

        Ok(students)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student =
            sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(executor)
                .await?;

        Ok(student)
    }

    // Filhos vinculados ao perfil do responsável
    pub async fn list_for_guardian(
        &self,
        tenant_id: Uuid,
        guardian_profile_id: Uuid,
    ) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE tenant_id = $1 AND guardian_profile_id = $2
            ORDER BY full_name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(guardian_profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    // Ficha vinculada ao login do próprio estudante
    pub async fn find_by_profile(
        &self,
        tenant_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE tenant_id = $1 AND profile_id = $2",
        )
        .bind(tenant_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateStudentPayload,
    ) -> Result<Student, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                tenant_id, full_name, birth_date, email, phone,
                guardian_name, guardian_phone, guardian_email,
                profile_id, guardian_profile_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.full_name)
        .bind(payload.birth_date)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.guardian_name.as_deref())
        .bind(payload.guardian_phone.as_deref())
        .bind(payload.guardian_email.as_deref())
        .bind(payload.profile_id)
        .bind(payload.guardian_profile_id)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(student)
    }

    // Atualização completa da ficha (PUT)
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &CreateStudentPayload,
    ) -> Result<Option<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                full_name = $3,
                birth_date = $4,
                email = $5,
                phone = $6,
                guardian_name = $7,
                guardian_phone = $8,
                guardian_email = $9,
                profile_id = $10,
                guardian_profile_id = $11,
                notes = $12,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&payload.full_name)
        .bind(payload.birth_date)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.guardian_name.as_deref())
        .bind(payload.guardian_phone.as_deref())
        .bind(payload.guardian_email.as_deref())
        .bind(payload.profile_id)
        .bind(payload.guardian_profile_id)
        .bind(payload.notes.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(student)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        status: StudentStatus,
    ) -> Result<Option<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(student)
    }

    pub async fn add_metric<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        student_id: Uuid,
        payload: &CreateBodyMetricPayload,
    ) -> Result<BodyMetric, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let metric = sqlx::query_as::<_, BodyMetric>(
            r#"
            INSERT INTO body_metrics (tenant_id, student_id, measured_at, height_cm, weight_kg, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(student_id)
        .bind(payload.measured_at)
        .bind(payload.height_cm)
        .bind(payload.weight_kg)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(metric)
    }

    pub async fn list_metrics<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<BodyMetric>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let metrics = sqlx::query_as::<_, BodyMetric>(
            r#"
            SELECT * FROM body_metrics
            WHERE tenant_id = $1 AND student_id = $2
            ORDER BY measured_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(student_id)
        .fetch_all(executor)
        .await?;

        Ok(metrics)
    }
}
