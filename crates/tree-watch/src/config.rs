use std::path::{Path, PathBuf};

/// Resolved watcher configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Canonical path to the vault root directory
    pub vault_path: PathBuf,
    /// Vault-relative directory mirrored by the tree ("" for the whole vault)
    pub root: String,
    /// Lowercase document extensions, without the dot
    pub extensions: Vec<String>,
}

impl WatchConfig {
    /// Validate and normalize raw settings.
    ///
    /// `vault` supports ~ for the home directory. `root` may carry leading or
    /// trailing slashes. Extensions may be given with or without a dot.
    pub fn new(vault: &str, root: &str, extensions: &[String]) -> Result<Self, ConfigError> {
        let vault_path = expand_tilde(vault);
        let vault_path = vault_path
            .canonicalize()
            .map_err(|_| ConfigError::VaultNotFound(vault_path.clone()))?;
        if !vault_path.is_dir() {
            return Err(ConfigError::VaultNotFound(vault_path));
        }

        let root = root.trim_matches('/').to_string();
        if root.split('/').any(|segment| segment == "..") {
            return Err(ConfigError::InvalidRoot(root));
        }
        if !root.is_empty() && !vault_path.join(&root).is_dir() {
            return Err(ConfigError::InvalidRoot(root));
        }

        let extensions: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }

        Ok(Self {
            vault_path,
            root,
            extensions,
        })
    }

    /// Absolute path of the mirrored directory.
    pub fn root_path(&self) -> PathBuf {
        full_path(&self.vault_path, &self.root)
    }
}

/// Join a vault-relative path onto the vault root.
pub(crate) fn full_path(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Expand ~ or ~/ prefix to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Vault directory not found: {0:?}")]
    VaultNotFound(PathBuf),

    #[error("Root is not a directory inside the vault: {0:?}")]
    InvalidRoot(String),

    #[error("At least one document extension is required")]
    NoExtensions,
}
