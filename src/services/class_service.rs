// src/services/class_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClassRepository, StudentRepository, UserRepository},
    models::{
        auth::{Profile, Role},
        classes::{
            AddSchedulePayload, ClassDetail, ClassSchedule, ClassSummary, CreateClassPayload, DanceClass,
            EnrollmentStatus, Enrollment, Occupancy, UpdateClassPayload,
        },
    },
};

#[derive(Clone)]
pub struct ClassService {
    repo: ClassRepository,
    student_repo: StudentRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ClassService {
    pub fn new(repo: ClassRepository, student_repo: StudentRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, student_repo, user_repo, pool }
    }

    /// A professora só enxerga as turmas em que leciona.
    pub async fn list(&self, viewer: &Profile, tenant_id: Uuid) -> Result<Vec<ClassSummary>, AppError> {
        let teacher_filter = (viewer.role == Role::Professor).then_some(viewer.id);
        let rows = self.repo.list_with_counts(&self.pool, tenant_id, teacher_filter).await?;
        Ok(rows.into_iter().map(ClassSummary::from).collect())
    }

    pub async fn get_detail(&self, viewer: &Profile, tenant_id: Uuid, id: Uuid) -> Result<ClassDetail, AppError> {
        let summary: ClassSummary = self
            .repo
            .find_with_count(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))?
            .into();

        if viewer.role == Role::Professor && summary.class.teacher_id != Some(viewer.id) {
            return Err(AppError::Forbidden);
        }

        let schedules = self.repo.list_schedules(&self.pool, tenant_id, id).await?;
        let roster = self.repo.roster(&self.pool, tenant_id, id).await?;

        Ok(ClassDetail { summary, schedules, roster })
    }

    pub async fn find_class(&self, tenant_id: Uuid, id: Uuid) -> Result<DanceClass, AppError> {
        self.repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))
    }

    // A professora indicada precisa ser da mesma escola e ter papel de professor
    async fn check_teacher(&self, tenant_id: Uuid, teacher_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(teacher_id) = teacher_id {
            let teacher = self
                .user_repo
                .find_profile_in_tenant(&self.pool, tenant_id, teacher_id)
                .await?
                .ok_or(AppError::NotFound("user_not_found"))?;
            if teacher.role != Role::Professor {
                return Err(AppError::RoleNotAssignable);
            }
        }
        Ok(())
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateClassPayload) -> Result<ClassSummary, AppError> {
        self.check_teacher(tenant_id, payload.teacher_id).await?;
        let class = self.repo.create(&self.pool, tenant_id, payload).await?;
        Ok(ClassSummary {
            occupancy: Occupancy::compute(0, class.capacity),
            teacher_name: None,
            class,
        })
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, payload: &UpdateClassPayload) -> Result<ClassSummary, AppError> {
        self.check_teacher(tenant_id, payload.teacher_id).await?;
        self.repo
            .update(&self.pool, tenant_id, id, payload)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))?;

        // Relê com a contagem atual
        self.repo
            .find_with_count(&self.pool, tenant_id, id)
            .await?
            .map(ClassSummary::from)
            .ok_or(AppError::NotFound("class_not_found"))
    }

    pub async fn add_schedule(&self, tenant_id: Uuid, class_id: Uuid, payload: &AddSchedulePayload) -> Result<ClassSchedule, AppError> {
        self.find_class(tenant_id, class_id).await?;
        self.repo.add_schedule(&self.pool, tenant_id, class_id, payload).await
    }

    pub async fn remove_schedule(&self, tenant_id: Uuid, class_id: Uuid, schedule_id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_schedule(&self.pool, tenant_id, class_id, schedule_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("schedule_not_found"))
        }
    }

    /// Matricula respeitando a capacidade. A linha da turma fica travada
    /// durante a contagem para duas matrículas simultâneas não furarem o limite.
    pub async fn enroll(&self, tenant_id: Uuid, class_id: Uuid, student_id: Uuid) -> Result<Enrollment, AppError> {
        let mut tx = self.pool.begin().await?;

        let class = self
            .repo
            .lock_for_enrollment(&mut *tx, tenant_id, class_id)
            .await?
            .ok_or(AppError::NotFound("class_not_found"))?;

        self.student_repo
            .find_by_id(&mut *tx, tenant_id, student_id)
            .await?
            .ok_or(AppError::NotFound("student_not_found"))?;

        if let Some(existing) = self.repo.find_enrollment(&mut *tx, class_id, student_id).await? {
            if existing.status == EnrollmentStatus::Ativa {
                return Err(AppError::AlreadyEnrolled);
            }
        }

        let active = self.repo.count_active_enrollments(&mut *tx, class_id).await?;
        if Occupancy::compute(active, class.capacity).is_full {
            return Err(AppError::ClassFull);
        }

        let enrollment = self
            .repo
            .upsert_active_enrollment(&mut *tx, tenant_id, class_id, student_id)
            .await?;

        tx.commit().await?;

        Ok(enrollment)
    }

    pub async fn cancel_enrollment(&self, tenant_id: Uuid, class_id: Uuid, student_id: Uuid) -> Result<Enrollment, AppError> {
        self.repo
            .cancel_enrollment(&self.pool, tenant_id, class_id, student_id)
            .await?
            .ok_or(AppError::NotFound("enrollment_not_found"))
    }
}
