// src/services/attendance_service.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AttendanceRepository, ClassRepository},
    models::{
        attendance::{can_take_attendance, AttendanceRecord, AttendanceSheet, TakeAttendancePayload},
        auth::{Profile, Role},
    },
};

#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    class_repo: ClassRepository,
    pool: PgPool,
}

impl AttendanceService {
    pub fn new(repo: AttendanceRepository, class_repo: ClassRepository, pool: PgPool) -> Self {
        Self { repo, class_repo, pool }
    }

    /// Chamada do dia. Só vale para quem está com matrícula ativa na turma;
    /// refazer a chamada sobrescreve o que já havia.
    pub async fn take_attendance(
        &self,
        taker: &Profile,
        tenant_id: Uuid,
        class_id: Uuid,
        payload: &TakeAttendancePayload,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let class = self
            .class_repo
            .find_by_id(&self.pool, tenant_id, class_id)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))?;

        if !can_take_attendance(taker, &class) {
            return Err(AppError::Forbidden);
        }

        let enrolled: HashSet<Uuid> = self
            .class_repo
            .active_student_ids(class_id)
            .await?
            .into_iter()
            .collect();

        if let Some(outsider) = payload.entries.iter().find(|e| !enrolled.contains(&e.student_id)) {
            return Err(AppError::StudentNotEnrolled(outsider.student_id));
        }

        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(payload.entries.len());

        for entry in &payload.entries {
            let record = self
                .repo
                .upsert_record(
                    &mut *tx,
                    tenant_id,
                    class_id,
                    entry.student_id,
                    payload.lesson_date,
                    entry.present,
                    entry.note.as_deref(),
                    taker.id,
                )
                .await?;
            records.push(record);
        }

        tx.commit().await?;

        Ok(records)
    }

    pub async fn sheet(
        &self,
        viewer: &Profile,
        tenant_id: Uuid,
        class_id: Uuid,
        lesson_date: NaiveDate,
    ) -> Result<AttendanceSheet, AppError> {
        let class = self
            .class_repo
            .find_by_id(&self.pool, tenant_id, class_id)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))?;

        if viewer.role == Role::Professor && class.teacher_id != Some(viewer.id) {
            return Err(AppError::Forbidden);
        }

        let entries = self.repo.sheet(tenant_id, class_id, lesson_date).await?;

        Ok(AttendanceSheet { class_id, lesson_date, entries })
    }
}
