// Module declarations
pub mod config;
pub mod persistence;
pub mod search;

// Re-export all implementations
pub use config::RepositoryConfig;
pub use persistence::InMemoryDocumentRepository;
