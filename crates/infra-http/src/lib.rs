// HTTP Infrastructure - adapters for the remote sourcing collaborators

pub mod config;
pub mod generator;
pub mod seeded_store;

pub use config::HttpConfig;
pub use generator::HttpGenerator;
pub use seeded_store::HttpSeededStore;
