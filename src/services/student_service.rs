// src/services/student_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AttendanceRepository, StudentRepository},
    models::{
        attendance::StudentAttendanceHistory,
        auth::{Profile, Role},
        students::{
            BodyMetric, CreateBodyMetricPayload, CreateStudentPayload, Student, StudentDetail, StudentFilter,
            StudentStatus,
        },
    },
};

#[derive(Clone)]
pub struct StudentService {
    repo: StudentRepository,
    attendance_repo: AttendanceRepository,
    pool: sqlx::PgPool,
}

impl StudentService {
    pub fn new(repo: StudentRepository, attendance_repo: AttendanceRepository, pool: sqlx::PgPool) -> Self {
        Self { repo, attendance_repo, pool }
    }

    pub async fn list(&self, tenant_id: Uuid, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        self.repo.list(&self.pool, tenant_id, filter).await
    }

    async fn require(&self, tenant_id: Uuid, id: Uuid) -> Result<Student, AppError> {
        self.repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("student_not_found"))
    }

    /// Quem pode ver a ficha: equipe da escola, o próprio estudante e o responsável.
    fn can_view(profile: &Profile, student: &Student) -> bool {
        match profile.role {
            Role::Estudante => student.profile_id == Some(profile.id),
            Role::Responsavel => student.guardian_profile_id == Some(profile.id),
            _ => profile.role.is_staff() || profile.role == Role::SuperAdmin,
        }
    }

    pub async fn get_detail(&self, viewer: &Profile, tenant_id: Uuid, id: Uuid) -> Result<StudentDetail, AppError> {
        let student = self.require(tenant_id, id).await?;
        if !Self::can_view(viewer, &student) {
            return Err(AppError::Forbidden);
        }

        let metrics = self.repo.list_metrics(&self.pool, tenant_id, id).await?;
        Ok(StudentDetail { student, metrics })
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateStudentPayload) -> Result<Student, AppError> {
        self.repo.create(&self.pool, tenant_id, payload).await
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, payload: &CreateStudentPayload) -> Result<Student, AppError> {
        self.repo
            .update(&self.pool, tenant_id, id, payload)
            .await?
            .ok_or(AppError::NotFound("student_not_found"))
    }

    pub async fn set_status(&self, tenant_id: Uuid, id: Uuid, status: StudentStatus) -> Result<Student, AppError> {
        self.repo
            .set_status(&self.pool, tenant_id, id, status)
            .await?
            .ok_or(AppError::NotFound("student_not_found"))
    }

    pub async fn add_metric(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        payload: &CreateBodyMetricPayload,
    ) -> Result<BodyMetric, AppError> {
        self.require(tenant_id, student_id).await?;
        self.repo.add_metric(&self.pool, tenant_id, student_id, payload).await
    }

    pub async fn list_metrics(&self, viewer: &Profile, tenant_id: Uuid, student_id: Uuid) -> Result<Vec<BodyMetric>, AppError> {
        let student = self.require(tenant_id, student_id).await?;
        if !Self::can_view(viewer, &student) {
            return Err(AppError::Forbidden);
        }
        self.repo.list_metrics(&self.pool, tenant_id, student_id).await
    }

    pub async fn attendance_history(
        &self,
        viewer: &Profile,
        tenant_id: Uuid,
        student_id: Uuid,
    ) -> Result<StudentAttendanceHistory, AppError> {
        let student = self.require(tenant_id, student_id).await?;
        if !Self::can_view(viewer, &student) {
            return Err(AppError::Forbidden);
        }

        let entries = self.attendance_repo.student_history(tenant_id, student_id).await?;
        Ok(StudentAttendanceHistory::from_entries(student_id, entries))
    }

    pub async fn list_for_guardian(&self, tenant_id: Uuid, guardian: &Profile) -> Result<Vec<Student>, AppError> {
        self.repo.list_for_guardian(tenant_id, guardian.id).await
    }

    pub async fn my_student(&self, tenant_id: Uuid, profile: &Profile) -> Result<Student, AppError> {
        self.repo
            .find_by_profile(tenant_id, profile.id)
            .await?
            .ok_or(AppError::NotFound("student_not_found"))
    }
}
