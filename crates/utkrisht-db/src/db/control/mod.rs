pub mod user;

pub use user::{UserRepository, UserRepositoryTrait};
