// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Público ---
        handlers::public::resolve_tenant,
        handlers::public::download_bundle,
        handlers::public::download_photo,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::signup,

        // --- Usuários ---
        handlers::users::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Alunas ---
        handlers::students::list_students,
        handlers::students::get_student,
        handlers::students::create_student,
        handlers::students::update_student,
        handlers::students::update_student_status,
        handlers::students::add_metric,
        handlers::students::list_metrics,
        handlers::students::attendance_history,
        handlers::students::my_students,
        handlers::students::my_student,

        // --- Turmas ---
        handlers::classes::list_classes,
        handlers::classes::get_class,
        handlers::classes::create_class,
        handlers::classes::update_class,
        handlers::classes::add_schedule,
        handlers::classes::remove_schedule,
        handlers::classes::enroll_student,
        handlers::classes::cancel_enrollment,

        // --- Chamada ---
        handlers::attendance::take_attendance,
        handlers::attendance::attendance_sheet,

        // --- CRM ---
        handlers::crm::create_lead,
        handlers::crm::list_leads,
        handlers::crm::get_lead,
        handlers::crm::update_lead,
        handlers::crm::delete_lead,
        handlers::crm::advance_lead,
        handlers::crm::set_lead_status,
        handlers::crm::funnel,

        // --- Fotos ---
        handlers::photos::create_album,
        handlers::photos::list_albums,
        handlers::photos::update_album,
        handlers::photos::upload_photo,
        handlers::photos::list_photos,
        handlers::photos::create_order,
        handlers::photos::list_orders,
        handlers::photos::get_order,
        handlers::photos::confirm_payment,
        handlers::photos::cancel_order,

        // --- Notificações ---
        handlers::notifications::create_notification,
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,

        // --- Cobrança / Admin / Dashboard ---
        handlers::billing::get_billing,
        handlers::admin::list_tenants,
        handlers::admin::create_tenant,
        handlers::admin::update_tenant,
        handlers::admin::deactivate_tenant,
        handlers::admin::update_billing,
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Profile,
            models::auth::LoginUserPayload,
            models::auth::SignupPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,

            // --- Escolas ---
            models::tenancy::BillingStatus,
            models::tenancy::Tenant,
            models::tenancy::TenantBranding,
            models::tenancy::TenantResolution,
            models::tenancy::TenantOverview,
            models::tenancy::CreateTenantPayload,
            models::tenancy::UpdateTenantPayload,
            models::tenancy::UpdateBillingPayload,
            models::settings::UpdateSettingsRequest,
            models::billing::BillingOverview,

            // --- Alunas ---
            models::students::StudentStatus,
            models::students::Student,
            models::students::BodyMetric,
            models::students::StudentDetail,
            models::students::CreateStudentPayload,
            models::students::UpdateStudentStatusPayload,
            models::students::CreateBodyMetricPayload,

            // --- Turmas ---
            models::classes::DanceClass,
            models::classes::Occupancy,
            models::classes::ClassSummary,
            models::classes::ClassSchedule,
            models::classes::EnrollmentStatus,
            models::classes::Enrollment,
            models::classes::RosterEntry,
            models::classes::ClassDetail,
            models::classes::CreateClassPayload,
            models::classes::UpdateClassPayload,
            models::classes::AddSchedulePayload,
            models::classes::EnrollPayload,

            // --- Chamada ---
            models::attendance::AttendanceRecord,
            models::attendance::AttendanceSheetEntry,
            models::attendance::AttendanceSheet,
            models::attendance::StudentAttendanceEntry,
            models::attendance::StudentAttendanceHistory,
            models::attendance::AttendanceEntryPayload,
            models::attendance::TakeAttendancePayload,

            // --- CRM ---
            models::crm::LeadStatus,
            models::crm::Lead,
            models::crm::AdvanceLeadResponse,
            models::crm::FunnelStage,
            models::crm::CreateLeadPayload,
            models::crm::UpdateLeadPayload,
            models::crm::SetLeadStatusPayload,

            // --- Fotos ---
            models::photos::PaymentStatus,
            models::photos::Album,
            models::photos::Photo,
            models::photos::PhotoPreview,
            models::photos::PhotoOrder,
            models::photos::PhotoOrderDetail,
            models::photos::SignedDownload,
            models::photos::DownloadBundle,
            models::photos::CreateAlbumPayload,
            models::photos::UpdateAlbumPayload,
            models::photos::CreateOrderPayload,

            // --- Notificações / Dashboard ---
            models::notifications::Notification,
            models::notifications::UnreadCount,
            models::notifications::CreateNotificationPayload,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Público", description = "Resolução da escola pelo domínio e downloads de fotos"),
        (name = "Auth", description = "Login e cadastro de escola"),
        (name = "Usuários", description = "Perfis e contas da escola"),
        (name = "Configurações", description = "Identidade visual (white-label)"),
        (name = "Alunas", description = "Cadastro, medidas e portais"),
        (name = "Turmas", description = "Turmas, horários e matrículas"),
        (name = "Chamada", description = "Presença por aula"),
        (name = "CRM", description = "Funil de leads"),
        (name = "Fotos", description = "Álbuns, pedidos e marca d'água"),
        (name = "Notificações", description = "Avisos da escola"),
        (name = "Cobrança", description = "Plano e mensalidade da escola"),
        (name = "Admin", description = "Gestão das escolas (super_admin)"),
        (name = "Dashboard", description = "Indicadores da direção")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_the_bearer_scheme_and_core_routes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(doc.paths.paths.contains_key("/api/crm/leads/{id}/advance"));
        assert!(doc.paths.paths.contains_key("/api/public/downloads/{order_id}"));
    }
}
