pub mod app_config;
pub mod catalog_repo;
pub mod seed;

pub use catalog_repo::InMemoryProductRepository;
pub use seed::{load_seed, parse_seed, seed_repository, SeedError};
