use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable holding the API token; takes precedence over the store
pub const API_TOKEN_ENV: &str = "API_TOKEN_TORBOX";

const API_TOKEN_KEY: &str = "torbox_api_token";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn get_api_token(&self) -> Option<&String> {
        self.get(API_TOKEN_KEY)
    }

    pub fn set_api_token(&mut self, token: String) {
        self.set(API_TOKEN_KEY.to_string(), token);
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

/// Pick the API token: `API_TOKEN_TORBOX` first, then the credential store.
///
/// Blank values count as missing.
pub fn resolve_api_token<F>(store: &CredentialStore, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_TOKEN_ENV)
        .filter(|token| !token.trim().is_empty())
        .or_else(|| store.get_api_token().cloned())
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
