// src/db/class_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::classes::{
        AddSchedulePayload, ClassSchedule, ClassWithCount, CreateClassPayload, DanceClass, Enrollment,
        RosterEntry, UpdateClassPayload,
    },
};

#[derive(Clone)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Turmas
    // ---

    /// Turmas com a contagem de matrículas ativas. `teacher_id` restringe às
    /// turmas de uma professora.
    pub async fn list_with_counts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        teacher_id: Option<Uuid>,
    ) -> Result<Vec<ClassWithCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let classes = sqlx::query_as::<_, ClassWithCount>(
            r#"
            SELECT c.*,
                p.full_name AS teacher_name,
                (SELECT COUNT(*) FROM enrollments e
                  WHERE e.class_id = c.id AND e.status = 'ativa') AS active_enrollments
            FROM classes c
            LEFT JOIN profiles p ON p.id = c.teacher_id
            WHERE c.tenant_id = $1
              AND ($2::UUID IS NULL OR c.teacher_id = $2)
            ORDER BY c.name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(teacher_id)
        .fetch_all(executor)
        .await?;

        Ok(classes)
    }

    pub async fn find_with_count<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ClassWithCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let class = sqlx::query_as::<_, ClassWithCount>(
            r#"
            SELECT c.*,
                p.full_name AS teacher_name,
                (SELECT COUNT(*) FROM enrollments e
                  WHERE e.class_id = c.id AND e.status = 'ativa') AS active_enrollments
            FROM classes c
            LEFT JOIN profiles p ON p.id = c.teacher_id
            WHERE c.id = $1 AND c.tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(class)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DanceClass>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let class =
            sqlx::query_as::<_, DanceClass>("SELECT * FROM classes WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(executor)
                .await?;

        Ok(class)
    }

    // Trava a linha da turma até o fim da transação (matrícula concorrente)
    pub async fn lock_for_enrollment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DanceClass>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let class = sqlx::query_as::<_, DanceClass>(
            "SELECT * FROM classes WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(class)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateClassPayload,
    ) -> Result<DanceClass, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let class = sqlx::query_as::<_, DanceClass>(
            r#"
            INSERT INTO classes (tenant_id, name, style, level, capacity, color, teacher_id)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, '#7C3AED'), $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(payload.style.as_deref())
        .bind(payload.level.as_deref())
        .bind(payload.capacity)
        .bind(payload.color.as_deref())
        .bind(payload.teacher_id)
        .fetch_one(executor)
        .await?;

        Ok(class)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateClassPayload,
    ) -> Result<Option<DanceClass>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let class = sqlx::query_as::<_, DanceClass>(
            r#"
            UPDATE classes SET
                name = COALESCE($3, name),
                style = COALESCE($4, style),
                level = COALESCE($5, level),
                capacity = COALESCE($6, capacity),
                color = COALESCE($7, color),
                teacher_id = COALESCE($8, teacher_id),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.name.as_deref())
        .bind(payload.style.as_deref())
        .bind(payload.level.as_deref())
        .bind(payload.capacity)
        .bind(payload.color.as_deref())
        .bind(payload.teacher_id)
        .bind(payload.is_active)
        .fetch_optional(executor)
        .await?;

        Ok(class)
    }

    // ---
    // Agenda
    // ---

    pub async fn list_schedules<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
    ) -> Result<Vec<ClassSchedule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedules = sqlx::query_as::<_, ClassSchedule>(
            r#"
            SELECT * FROM class_schedules
            WHERE tenant_id = $1 AND class_id = $2
            ORDER BY weekday ASC, start_time ASC
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .fetch_all(executor)
        .await?;

        Ok(schedules)
    }

    pub async fn add_schedule<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
        payload: &AddSchedulePayload,
    ) -> Result<ClassSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, ClassSchedule>(
            r#"
            INSERT INTO class_schedules (tenant_id, class_id, weekday, start_time, end_time, room)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .bind(payload.weekday)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.room.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(schedule)
    }

    // Retorna false se o horário não existe nesta turma
    pub async fn delete_schedule<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM class_schedules WHERE id = $1 AND class_id = $2 AND tenant_id = $3",
        )
        .bind(schedule_id)
        .bind(class_id)
        .bind(tenant_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---
    // Matrículas
    // ---

    pub async fn count_active_enrollments<'e, E>(&self, executor: E, class_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE class_id = $1 AND status = 'ativa'",
        )
        .bind(class_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn find_enrollment<'e, E>(
        &self,
        executor: E,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE class_id = $1 AND student_id = $2",
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_optional(executor)
        .await?;

        Ok(enrollment)
    }

    /// Cria a matrícula ou reativa uma cancelada (mesmo par turma/estudante).
    pub async fn upsert_active_enrollment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<Enrollment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (tenant_id, class_id, student_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (class_id, student_id) DO UPDATE
                SET status = 'ativa',
                    enrolled_at = NOW(),
                    cancelled_at = NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .bind(student_id)
        .fetch_one(executor)
        .await?;

        Ok(enrollment)
    }

    pub async fn cancel_enrollment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments SET status = 'cancelada', cancelled_at = NOW()
            WHERE tenant_id = $1 AND class_id = $2 AND student_id = $3 AND status = 'ativa'
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .bind(student_id)
        .fetch_optional(executor)
        .await?;

        Ok(enrollment)
    }

    pub async fn roster<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        class_id: Uuid,
    ) -> Result<Vec<RosterEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let roster = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT e.id AS enrollment_id, s.id AS student_id, s.full_name,
                   s.status AS student_status, e.enrolled_at
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.tenant_id = $1 AND e.class_id = $2 AND e.status = 'ativa'
            ORDER BY s.full_name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(class_id)
        .fetch_all(executor)
        .await?;

        Ok(roster)
    }

    pub async fn active_student_ids(&self, class_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT student_id FROM enrollments WHERE class_id = $1 AND status = 'ativa'",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
