pub mod auth;
pub mod tenancy_service;
pub mod student_service;
pub mod class_service;
pub mod attendance_service;
pub mod crm_service;
pub mod photo_service;
pub mod notification_service;
pub mod dashboard_service;
pub mod watermark;

pub use auth::AuthService;
pub use tenancy_service::{TenantResolver, TenantService};
pub use student_service::StudentService;
pub use class_service::ClassService;
pub use attendance_service::AttendanceService;
pub use crm_service::CrmService;
pub use photo_service::PhotoService;
pub use notification_service::NotificationService;
pub use dashboard_service::DashboardService;
