pub mod admin_service;
pub use admin_service::AdminService;
pub mod auth;
pub use auth::AuthService;
pub mod open_window;
pub mod report_service;
pub use report_service::ReportService;
pub mod shop_service;
pub use shop_service::ShopService;
pub mod theme_service;
pub use theme_service::ThemeService;
