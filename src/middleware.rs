pub mod auth;
pub mod client_info;
pub mod rbac;
