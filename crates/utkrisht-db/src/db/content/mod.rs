pub mod blog;
pub mod inquiry;
pub mod portfolio;
pub mod project;
pub mod project_image;

pub use blog::{BlogRepository, BlogRepositoryTrait};
pub use inquiry::{InquiryRepository, InquiryRepositoryTrait};
pub use portfolio::{PortfolioRepository, PortfolioRepositoryTrait};
pub use project::{ProjectRepository, ProjectRepositoryTrait};
pub use project_image::{ProjectImageRepository, ProjectImageRepositoryTrait};
