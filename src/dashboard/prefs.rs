//! Active-tab preference
//!
//! The one piece of state that survives a restart. Stored as a small JSON file;
//! a missing or unreadable file just means "no preference".

use crate::view::Tab;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefsFile {
    active_tab: Tab,
}

#[derive(Debug)]
pub struct TabPreferenceStore {
    path: Option<PathBuf>,
    current: RwLock<Option<Tab>>,
}

impl TabPreferenceStore {
    /// In-memory only, nothing is written
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Restore the preference stored at `path`, if any
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let stored = match read_prefs(&path) {
            Ok(Some(tab)) => {
                info!(path = %path.display(), tab = %tab, "Restored tab preference");
                Some(tab)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable tab preference");
                None
            }
        };
        Self {
            path: Some(path),
            current: RwLock::new(stored),
        }
    }

    pub async fn get(&self) -> Option<Tab> {
        *self.current.read().await
    }

    /// Remember `tab` and write it to disk. The in-memory value is updated
    /// even if the write fails.
    pub async fn set(&self, tab: Tab) -> Result<()> {
        *self.current.write().await = Some(tab);

        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&PrefsFile { active_tab: tab })?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn read_prefs(path: &Path) -> Result<Option<Tab>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)?;
    let prefs: PrefsFile = serde_json::from_str(&json)?;
    Ok(Some(prefs.active_tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_prefs_path(test_name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "prismdash_prefs_{}_{}",
            test_name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("prefs.json")
    }

    #[tokio::test]
    async fn test_missing_file_has_no_preference() {
        let store = TabPreferenceStore::load(temp_prefs_path("missing"));
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn test_preference_survives_reload() {
        let path = temp_prefs_path("reload");
        let store = TabPreferenceStore::load(&path);
        store.set(Tab::AiLogs).await.unwrap();

        let reloaded = TabPreferenceStore::load(&path);
        assert_eq!(reloaded.get().await, Some(Tab::AiLogs));
        assert!(fs::read_to_string(&path).unwrap().contains("ai-logs"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ignored() {
        let path = temp_prefs_path("corrupt");
        fs::write(&path, "{ \"active_tab\": \"positions\" }").unwrap();
        let store = TabPreferenceStore::load(&path);
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn test_ephemeral_store_keeps_value_in_memory() {
        let store = TabPreferenceStore::ephemeral();
        store.set(Tab::Performance).await.unwrap();
        assert_eq!(store.get().await, Some(Tab::Performance));
    }
}
