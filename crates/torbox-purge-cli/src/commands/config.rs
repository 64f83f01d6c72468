use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use purge_config::{resolve_api_token, Config, CredentialStore, PathManager};
use purge_models::Category;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, path_manager: &PathManager, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(path_manager, output),
        ConfigCommands::Init { force } => init_config(path_manager, force, output),
        ConfigCommands::Token { token } => store_token(path_manager, token, output),
        ConfigCommands::Path => show_paths(path_manager, output),
    }
}

fn show_config(path_manager: &PathManager, output: &Output) -> Result<()> {
    let config = Config::load(path_manager)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config: {}", e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let token = resolve_api_token(&cred_store, |key| std::env::var(key).ok());
    let masked = token.as_deref().map(mask_secret);

    if !output.is_human() {
        output.json(&json!({
            "config": config,
            "api_token": masked,
            "valid": config.validate().is_ok(),
        }));
        return Ok(());
    }

    let categories: Vec<&str> = config.categories.iter().map(|c| c.as_str()).collect();
    output.info(format!("Config file:       {}", path_manager.config_file().display()));
    output.info(format!(
        "Categories:        {}",
        if categories.is_empty() { "(none)".to_string() } else { categories.join(", ") }
    ));
    output.info(format!("Stall threshold:   {}s", config.thresholds.stall_seconds));
    output.info(format!("ETA threshold:     {}s", config.thresholds.eta_seconds));
    output.info(format!("Check interval:    {}s", config.scheduler.check_interval_seconds));
    output.info(format!("Run on startup:    {}", config.scheduler.run_on_startup));
    output.info(format!("API base URL:      {}", config.api.base_url));
    output.info(format!("Page size:         {}", config.api.page_size));
    output.info(format!(
        "API token:         {}",
        masked.unwrap_or_else(|| "(not set)".to_string())
    ));

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not usable yet: {}", e));
    }
    Ok(())
}

fn init_config(path_manager: &PathManager, force: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!(
            "{} already exists. Use --force to overwrite it.",
            config_file.display()
        ));
        return Ok(());
    }

    let config = Config {
        categories: Category::ALL.to_vec(),
        ..Config::default()
    };
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn store_token(path_manager: &PathManager, token: Option<String>, output: &Output) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("TorBox API token: ")
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read token: {}", e))?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(color_eyre::eyre::eyre!("Token cannot be empty"));
    }

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load {}: {}", credentials_file.display(), e))?;
    cred_store.set_api_token(token);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save {}: {}", credentials_file.display(), e))?;

    output.success(format!("API token saved to {}", credentials_file.display()));
    Ok(())
}

fn show_paths(path_manager: &PathManager, output: &Output) -> Result<()> {
    if !output.is_human() {
        output.json(&json!({
            "config_file": path_manager.config_file(),
            "credentials_file": path_manager.credentials_file(),
            "log_file": path_manager.daemon_log_file(),
        }));
        return Ok(());
    }

    output.info(format!("Config file:      {}", path_manager.config_file().display()));
    output.info(format!("Credentials file: {}", path_manager.credentials_file().display()));
    output.info(format!("Log file:         {}", path_manager.daemon_log_file().display()));
    Ok(())
}

/// Keep the first and last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret("abcd1234efgh5678"), "abcd…5678");
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let output = Output::new(crate::output::OutputFormat::Json, true);

        init_config(&paths, false, &output).unwrap();

        let config = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(config.categories, vec![Category::Torrent, Category::WebDownload]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_token_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let output = Output::new(crate::output::OutputFormat::Json, true);

        store_token(&paths, Some("  secret-token ".to_string()), &output).unwrap();

        let mut store = CredentialStore::new(paths.credentials_file());
        store.load().unwrap();
        assert_eq!(store.get_api_token(), Some(&"secret-token".to_string()));

        assert!(store_token(&paths, Some("   ".to_string()), &output).is_err());
    }
}
