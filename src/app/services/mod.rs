pub mod account;
pub mod blog;
pub mod dashboard;
pub mod download;
pub mod landing;
pub mod profile;
pub mod reviews;

#[cfg(test)]
pub(crate) mod fake;

pub use account::AccountService;
pub use blog::BlogService;
pub use dashboard::DashboardService;
pub use download::DownloadService;
pub use landing::LandingService;
pub use profile::ProfileService;
pub use reviews::ReviewService;
