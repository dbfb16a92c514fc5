//! On-disk cache of OAuth credentials, one JSON file per user id.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::models::StoredCredential;

/// Token cache rooted at the configured tokens directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    directory: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", user_id))
    }

    /// Load the credential stored for `user_id`, if any.
    pub fn load(&self, user_id: &str) -> Result<Option<StoredCredential>> {
        let path = self.path_for(user_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                // A corrupt cache only forces a new authorization.
                debug!("Ignoring unreadable token file {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Persist `credential` for `user_id`, creating the directory if needed.
    pub fn save(&self, user_id: &str, credential: &StoredCredential) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(user_id);
        fs::write(&path, serde_json::to_vec_pretty(credential)?)?;
        restrict_permissions(&path)?;
        debug!("Stored credential in {:?}", path);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
