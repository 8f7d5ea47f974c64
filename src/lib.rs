// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::{auth_guard, tenant_guard};

// Fotos de câmera chegam a dezenas de MB
const MAX_UPLOAD_BYTES: usize = 40 * 1024 * 1024;

/// Monta o router completo da API.
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas (sem token)
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/public/tenant", get(handlers::public::resolve_tenant))
        .route(
            "/api/public/downloads/{order_id}",
            get(handlers::public::download_bundle),
        )
        .route(
            "/api/public/downloads/{order_id}/photos/{photo_id}",
            get(handlers::public::download_photo),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/storage/{*key}", get(handlers::public::serve_object));

    // Só autenticação: não dependem de uma escola na requisição
    let account_routes = Router::new()
        .route("/api/users/me", get(handlers::users::get_me))
        .route("/api/users", post(handlers::users::create_user))
        .route(
            "/api/admin/tenants",
            get(handlers::admin::list_tenants).post(handlers::admin::create_tenant),
        )
        .route(
            "/api/admin/tenants/{id}",
            put(handlers::admin::update_tenant).delete(handlers::admin::deactivate_tenant),
        )
        .route(
            "/api/admin/tenants/{id}/billing",
            put(handlers::admin::update_billing),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Autenticação + escola
    let school_routes = Router::new()
        // Usuários
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/{id}", put(handlers::users::update_user))
        // Configurações e cobrança
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/api/billing", get(handlers::billing::get_billing))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        // Alunas
        .route(
            "/api/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/api/students/{id}",
            get(handlers::students::get_student).put(handlers::students::update_student),
        )
        .route(
            "/api/students/{id}/status",
            put(handlers::students::update_student_status),
        )
        .route(
            "/api/students/{id}/metrics",
            get(handlers::students::list_metrics).post(handlers::students::add_metric),
        )
        .route(
            "/api/students/{id}/attendance",
            get(handlers::students::attendance_history),
        )
        .route("/api/me/students", get(handlers::students::my_students))
        .route("/api/me/student", get(handlers::students::my_student))
        // Turmas e chamada
        .route(
            "/api/classes",
            get(handlers::classes::list_classes).post(handlers::classes::create_class),
        )
        .route(
            "/api/classes/{id}",
            get(handlers::classes::get_class).put(handlers::classes::update_class),
        )
        .route(
            "/api/classes/{id}/schedules",
            post(handlers::classes::add_schedule),
        )
        .route(
            "/api/classes/{id}/schedules/{schedule_id}",
            delete(handlers::classes::remove_schedule),
        )
        .route(
            "/api/classes/{id}/enrollments",
            post(handlers::classes::enroll_student),
        )
        .route(
            "/api/classes/{id}/enrollments/{student_id}",
            delete(handlers::classes::cancel_enrollment),
        )
        .route(
            "/api/classes/{id}/attendance",
            get(handlers::attendance::attendance_sheet).post(handlers::attendance::take_attendance),
        )
        // CRM
        .route(
            "/api/crm/leads",
            get(handlers::crm::list_leads).post(handlers::crm::create_lead),
        )
        .route(
            "/api/crm/leads/{id}",
            get(handlers::crm::get_lead)
                .put(handlers::crm::update_lead)
                .delete(handlers::crm::delete_lead),
        )
        .route("/api/crm/leads/{id}/advance", post(handlers::crm::advance_lead))
        .route("/api/crm/leads/{id}/status", put(handlers::crm::set_lead_status))
        .route("/api/crm/funnel", get(handlers::crm::funnel))
        // Fotos
        .route(
            "/api/photos/albums",
            get(handlers::photos::list_albums).post(handlers::photos::create_album),
        )
        .route("/api/photos/albums/{id}", put(handlers::photos::update_album))
        .route(
            "/api/photos/albums/{id}/photos",
            get(handlers::photos::list_photos)
                .post(handlers::photos::upload_photo)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/photos/orders",
            get(handlers::photos::list_orders).post(handlers::photos::create_order),
        )
        .route("/api/photos/orders/{id}", get(handlers::photos::get_order))
        .route(
            "/api/photos/orders/{id}/confirm-payment",
            post(handlers::photos::confirm_payment),
        )
        .route("/api/photos/orders/{id}/cancel", post(handlers::photos::cancel_order))
        // Notificações
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications)
                .post(handlers::notifications::create_notification),
        )
        .route(
            "/api/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route("/api/notifications/{id}/read", post(handlers::notifications::mark_read))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(school_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
