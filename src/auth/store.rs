use std::fs;
use std::path::{Path, PathBuf};

use super::error::AuthError;
use super::token::TokenRecord;

/// Storage abstraction for the persisted token record.
///
/// Single-account by design: there is exactly one record. The durable
/// copy is the source of truth across process restarts.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenRecord>, AuthError>;
    fn save(&self, record: &TokenRecord) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// File-backed token store: one JSON file, overwritten on every save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn new_default() -> Self {
        Self {
            path: default_token_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenRecord>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let record: TokenRecord = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }

    fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        Self::ensure_parent(&self.path)?;
        let serialized = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

/// Default location for the token file (`~/.tonearm/token.json`).
pub fn default_token_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tonearm").join("token.json"))
        .unwrap_or_else(|| PathBuf::from("token.json"))
}
