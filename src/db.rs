pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod student_repo;
pub use student_repo::StudentRepository;
pub mod class_repo;
pub use class_repo::ClassRepository;
pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod photo_repo;
pub use photo_repo::PhotoRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
