pub mod preference_repo;
pub use preference_repo::PreferenceRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod shop_repo;
pub use shop_repo::ShopRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
