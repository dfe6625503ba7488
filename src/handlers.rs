pub mod admin;
pub mod auth;
pub mod health;
pub mod reports;
pub mod shops;
pub mod theme;
