pub mod auth;
pub mod pagination;
pub mod report;
pub mod shop;
pub mod theme;
