pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ApiConfig, Config, SchedulerConfig, ThresholdConfig, DEFAULT_API_BASE, REQUEST_TIMEOUT_SECS};
pub use credentials::{resolve_api_token, CredentialStore, API_TOKEN_ENV};
pub use paths::{container_base_path, PathManager};
