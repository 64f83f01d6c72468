pub mod config;
pub mod daemon;
pub mod once;
pub mod scan;

use color_eyre::Result;
use purge_config::{resolve_api_token, Config, CredentialStore, PathManager};
use purge_core::{CleanupTask, Thresholds};
use purge_sources::TorboxClient;

/// Load the effective configuration and refuse to continue if it is unusable
pub(crate) fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config = Config::load(path_manager).map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load config from {}: {}",
            path_manager.config_file().display(),
            e
        )
    })?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    Ok(config)
}

/// Build the cleanup task against the real service.
///
/// A missing token is only a warning (logged by the client); every request
/// will then be refused by the service and logged.
pub(crate) fn build_task(
    path_manager: &PathManager,
    config: &Config,
    dry_run: bool,
) -> Result<CleanupTask<TorboxClient>> {
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    let api_token = resolve_api_token(&cred_store, |key| std::env::var(key).ok());

    let client = TorboxClient::from_config(config, api_token)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create API client: {}", e))?;

    let thresholds = Thresholds::from_secs(config.thresholds.stall_seconds, config.thresholds.eta_seconds);
    Ok(CleanupTask::new(client, config.categories.clone(), thresholds)
        .with_page_size(config.api.page_size)
        .with_dry_run(dry_run))
}
