pub mod auth;
pub mod tenancy;
pub mod settings;
pub mod students;
pub mod classes;
pub mod attendance;
pub mod crm;
pub mod photos;
pub mod notifications;
pub mod billing;
pub mod dashboard;
