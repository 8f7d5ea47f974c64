pub mod admin;
pub mod attendance;
pub mod auth;
pub mod billing;
pub mod classes;
pub mod crm;
pub mod dashboard;
pub mod notifications;
pub mod photos;
pub mod public;
pub mod settings;
pub mod students;
pub mod users;
