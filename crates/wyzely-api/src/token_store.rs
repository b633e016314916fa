// Token persistence.
//
// A cached `{access_token, refresh_token}` JSON file per account keeps
// restarts from costing a login. Failures here are logged and
// swallowed: losing the cache only costs one extra login.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::models::TokenPair;

/// Per-account token cache file.
///
/// The file name is a stable identifier derived from the account name,
/// so the same account finds its tokens again across restarts.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store rooted at `dir` (or the platform data dir when `None`),
    /// keyed by the account name.
    pub fn for_account(username: &str, dir: Option<&Path>) -> Self {
        let id = format!(
            "{:x}",
            md5::compute(username.trim().to_lowercase().as_bytes())
        );
        let root = dir
            .map(Path::to_path_buf)
            .or_else(default_dir)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            path: root.join(format!("{id}.json")),
        }
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached pair, if a readable one exists.
    pub fn load(&self) -> Option<TokenPair> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(pair) => Some(pair),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring unreadable token cache");
                None
            }
        }
    }

    /// Write the pair, logging (never propagating) any failure.
    pub fn save(&self, pair: &TokenPair) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "could not create token cache directory");
                return;
            }
        }
        match serde_json::to_string_pretty(pair) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!(path = %self.path.display(), error = %e, "could not persist token pair");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize token pair"),
        }
    }
}

fn default_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wyzely").map(|dirs| dirs.data_dir().to_path_buf())
}
