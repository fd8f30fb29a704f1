//! Infrastructure implementations of the `RunStateStore` port.
//!
//! - [`ActionsStateStore`] uses the host pipeline's state mechanism: values
//!   saved by one invocation are appended to the `GITHUB_STATE` file and
//!   show up as `STATE_<name>` environment variables in the post invocation.
//! - [`FileStateStore`] keeps the same data in a JSON file for local runs,
//!   written atomically (temp file + rename).

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::RunStateStore;
use crate::domain::{Phase, ProvisioningRecord};

const KEY_IS_POST: &str = "isPost";
const KEY_CONNECTED: &str = "connected";
const KEY_CONNECTED_AT: &str = "connected_at";

// ── GitHub Actions state ──────────────────────────────────────────────────────

/// State store backed by `GITHUB_STATE` / `STATE_*`.
#[derive(Debug, Clone)]
pub struct ActionsStateStore {
    state_file: PathBuf,
    saved: HashMap<String, String>,
}

impl ActionsStateStore {
    /// Build from an explicit state file and the values saved by an earlier
    /// invocation (keys without the `STATE_` prefix).
    #[must_use]
    pub fn new(state_file: PathBuf, saved: HashMap<String, String>) -> Self {
        Self { state_file, saved }
    }

    /// Build from the process environment, or `None` outside GitHub Actions.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let state_file = std::env::var_os("GITHUB_STATE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)?;
        let saved = std::env::vars()
            .filter_map(|(k, v)| k.strip_prefix("STATE_").map(|name| (name.to_string(), v)))
            .collect();
        Some(Self::new(state_file, saved))
    }

    /// Saved value, treating empty as absent.
    fn get(&self, key: &str) -> Option<&str> {
        self.saved
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn append(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.state_file)
            .with_context(|| format!("opening state file {}", self.state_file.display()))?;
        for (key, value) in entries {
            writeln!(file, "{key}={value}")
                .with_context(|| format!("writing state file {}", self.state_file.display()))?;
        }
        Ok(())
    }
}

impl RunStateStore for ActionsStateStore {
    async fn load_record(&self) -> Result<ProvisioningRecord> {
        let connected_at = self
            .get(KEY_CONNECTED_AT)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|t| t.with_timezone(&Utc));
        Ok(ProvisioningRecord {
            connected: self.get(KEY_CONNECTED).is_some(),
            connected_at,
        })
    }

    async fn save_record(&self, record: &ProvisioningRecord) -> Result<()> {
        if !record.connected {
            // An empty value reads back as "not connected".
            return self.append(&[(KEY_CONNECTED, "")]);
        }
        let at = record.connected_at.map(|t| t.to_rfc3339()).unwrap_or_default();
        self.append(&[(KEY_CONNECTED, "true"), (KEY_CONNECTED_AT, &at)])
    }

    async fn phase(&self) -> Result<Phase> {
        Ok(if self.get(KEY_IS_POST).is_some() {
            Phase::Post
        } else {
            Phase::Main
        })
    }

    async fn mark_main_done(&self) -> Result<()> {
        self.append(&[(KEY_IS_POST, "true")])
    }
}

// ── Local JSON file state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    post: bool,
    #[serde(flatten)]
    record: ProvisioningRecord,
}

/// State file manager for runs outside GitHub Actions.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a state store using the default path (`~/.setup-warp/state.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".setup-warp").join("state.json")))
    }

    /// Create a state store with an explicit path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn load_sync(&self) -> Result<StateFile> {
        if !self.path.exists() {
            return Ok(StateFile::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", self.path.display()))
    }

    fn save_sync(&self, state: &StateFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(state).context("serializing state")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))?;
        Ok(())
    }

    async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut StateFile) + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut state = store.load_sync()?;
            f(&mut state);
            store.save_sync(&state)
        })
        .await
        .context("state save task panicked")?
    }

    async fn load(&self) -> Result<StateFile> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_sync())
            .await
            .context("state load task panicked")?
    }
}

impl RunStateStore for FileStateStore {
    async fn load_record(&self) -> Result<ProvisioningRecord> {
        Ok(self.load().await?.record)
    }

    async fn save_record(&self, record: &ProvisioningRecord) -> Result<()> {
        let record = record.clone();
        self.update(move |state| state.record = record).await
    }

    async fn phase(&self) -> Result<Phase> {
        Ok(if self.load().await?.post {
            Phase::Post
        } else {
            Phase::Main
        })
    }

    async fn mark_main_done(&self) -> Result<()> {
        self.update(|state| state.post = true).await
    }
}

// ── Backend selection ─────────────────────────────────────────────────────────

/// The state store chosen for this invocation.
#[derive(Debug, Clone)]
pub enum StateBackend {
    Actions(ActionsStateStore),
    File(FileStateStore),
}

impl StateBackend {
    /// Use GitHub Actions state when available, otherwise a JSON file at
    /// `path` (or the default location).
    ///
    /// # Errors
    ///
    /// Returns an error if no path is given and the home directory cannot be
    /// determined.
    pub fn detect(path: Option<PathBuf>) -> Result<Self> {
        if let Some(store) = ActionsStateStore::from_env() {
            return Ok(Self::Actions(store));
        }
        Ok(Self::File(match path {
            Some(p) => FileStateStore::with_path(p),
            None => FileStateStore::new()?,
        }))
    }
}

impl RunStateStore for StateBackend {
    async fn load_record(&self) -> Result<ProvisioningRecord> {
        match self {
            Self::Actions(s) => s.load_record().await,
            Self::File(s) => s.load_record().await,
        }
    }

    async fn save_record(&self, record: &ProvisioningRecord) -> Result<()> {
        match self {
            Self::Actions(s) => s.save_record(record).await,
            Self::File(s) => s.save_record(record).await,
        }
    }

    async fn phase(&self) -> Result<Phase> {
        match self {
            Self::Actions(s) => s.phase().await,
            Self::File(s) => s.phase().await,
        }
    }

    async fn mark_main_done(&self) -> Result<()> {
        match self {
            Self::Actions(s) => s.mark_main_done().await,
            Self::File(s) => s.mark_main_done().await,
        }
    }
}
