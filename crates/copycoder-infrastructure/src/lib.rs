//! Infrastructure layer for CopyCoder: storage backends, versioned
//! persistence, configuration loading and path resolution.

pub mod config_service;
pub mod dto;
pub mod file_loader;
pub mod paths;
pub mod state_repository;
pub mod storage;

pub use config_service::ConfigService;
pub use file_loader::load_selected_file;
pub use paths::CopyCoderPaths;
pub use state_repository::StateRepositoryImpl;
pub use storage::JsonFileStore;
