//! Namespace persistence.
//!
//! Each namespace is one versioned JSON document under the data directory
//! (`tbb-widgets.json`, `tbb-templates.json`, `tbb-navigation.json`).
//! Writes are atomic (temp file + rename). Loading is best-effort: a missing
//! document yields `None`, and a document that does not parse or fails
//! validation is quarantined as `<file>.corrupt-<timestamp>` so the caller can
//! fall back to its default without losing the original bytes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use blackbox_core::models::{DashboardState, TabId};
use blackbox_core::paths::{ensure_dir, namespace_file};
use blackbox_core::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::templates::TemplatePreset;

// ── Schema version ──────────────────────────────────────────────────────

/// Current document schema version.
pub const SCHEMA_VERSION: u32 = 1;

pub const WIDGETS_NAMESPACE: &str = "tbb-widgets";
pub const TEMPLATES_NAMESPACE: &str = "tbb-templates";
pub const NAVIGATION_NAMESPACE: &str = "tbb-navigation";

const LOCK_FILE: &str = ".lock";
const LOCK_TIMEOUT: Duration = Duration::from_secs(2);
const LOCK_RETRY: Duration = Duration::from_millis(25);

// ── Documents ───────────────────────────────────────────────────────────

/// A JSON document stored under its own namespace.
pub trait PersistedDocument: Serialize + DeserializeOwned {
    const NAMESPACE: &'static str;

    fn version(&self) -> u32;

    /// Reject documents that parsed but cannot be used.
    fn validate(&self) -> Result<()> {
        check_version(self.version())
    }
}

fn check_version(version: u32) -> Result<()> {
    if version == 0 || version > SCHEMA_VERSION {
        Err(Error::InvalidState(format!(
            "unsupported schema version {version} (expected <= {SCHEMA_VERSION})"
        )))
    } else {
        Ok(())
    }
}

/// Dashboard state together with its undo/redo stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDashboard {
    pub version: u32,
    pub state: DashboardState,
    #[serde(default)]
    pub history_past: Vec<DashboardState>,
    #[serde(default)]
    pub history_future: Vec<DashboardState>,
}

impl PersistedDocument for PersistedDashboard {
    const NAMESPACE: &'static str = WIDGETS_NAMESPACE;

    fn version(&self) -> u32 {
        self.version
    }

    fn validate(&self) -> Result<()> {
        check_version(self.version)?;
        self.state.validate()?;
        for entry in self.history_past.iter().chain(&self.history_future) {
            entry.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTemplates {
    pub version: u32,
    #[serde(default)]
    pub templates: Vec<TemplatePreset>,
}

impl PersistedDocument for PersistedTemplates {
    const NAMESPACE: &'static str = TEMPLATES_NAMESPACE;

    fn version(&self) -> u32 {
        self.version
    }

    fn validate(&self) -> Result<()> {
        check_version(self.version)?;
        for template in &self.templates {
            template.snapshot.to_state().validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNavigation {
    pub version: u32,
    #[serde(default)]
    pub active_tab: TabId,
}

impl PersistedDocument for PersistedNavigation {
    const NAMESPACE: &'static str = NAVIGATION_NAMESPACE;

    fn version(&self) -> u32 {
        self.version
    }
}

// ── Store ───────────────────────────────────────────────────────────────

/// Directory of namespace documents, held under an exclusive lock.
#[derive(Debug)]
pub struct NamespaceStore {
    root: PathBuf,
    lock: File,
}

impl NamespaceStore {
    /// Create `root` if needed and take its advisory lock.
    ///
    /// Fails with an I/O error if another process keeps the lock for longer
    /// than a couple of seconds.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        let lock = acquire_lock(&root.join(LOCK_FILE))?;
        Ok(Self { root, lock })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_of(&self, namespace: &str) -> PathBuf {
        namespace_file(&self.root, namespace)
    }

    /// Load a document, quarantining it if it is corrupt.
    ///
    /// Returns `None` when the document is missing or unusable.
    #[must_use]
    pub fn load<D: PersistedDocument>(&self) -> Option<D> {
        let path = self.path_of(D::NAMESPACE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    namespace = D::NAMESPACE,
                    path = %path.display(),
                    error = %e,
                    "failed to read persisted namespace; using defaults"
                );
                return None;
            }
        };

        let outcome = serde_json::from_str::<D>(&contents)
            .map_err(Error::from)
            .and_then(|doc| doc.validate().map(|()| doc));
        match outcome {
            Ok(doc) => Some(doc),
            Err(e) => {
                let quarantined = quarantine(&path);
                tracing::warn!(
                    namespace = D::NAMESPACE,
                    path = %path.display(),
                    quarantined = ?quarantined,
                    error = %e,
                    "persisted namespace is corrupt; using defaults"
                );
                None
            }
        }
    }

    /// Atomically write a document.
    pub fn save<D: PersistedDocument>(&self, doc: &D) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        atomic_write_bytes(&self.path_of(D::NAMESPACE), &bytes)?;
        tracing::debug!(namespace = D::NAMESPACE, bytes = bytes.len(), "namespace saved");
        Ok(())
    }
}

impl Drop for NamespaceStore {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock) {
            tracing::debug!(root = %self.root.display(), error = %e, "failed to release store lock");
        }
    }
}

fn acquire_lock(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    let start = Instant::now();
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(e) if start.elapsed() >= LOCK_TIMEOUT => {
                return Err(Error::Io(io::Error::new(
                    e.kind(),
                    format!("data directory lock {} is held elsewhere: {e}", path.display()),
                )));
            }
            Err(_) => thread::sleep(LOCK_RETRY),
        }
    }
}

/// Move a corrupt document aside; returns the new path on success.
fn quarantine(path: &Path) -> Option<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f").to_string();
    let base_name = path.file_name()?.to_string_lossy().into_owned();
    let target = path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));
    match fs::rename(path, &target) {
        Ok(()) => Some(target),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to quarantine corrupt file");
            None
        }
    }
}

fn atomic_write_bytes(path: &Path, data: &[u8]) -> io::Result<()> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        ".tmp-{}-{seq}-{}",
        std::process::id(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let tmp_path = parent.join(tmp_name);
    let mut f = File::create(&tmp_path)?;
    f.write_all(data)?;
    f.sync_data()?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}
