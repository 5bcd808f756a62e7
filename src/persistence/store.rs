//! Save storage backends

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::record::SaveRecord;

/// Where the save record lives
pub trait SaveStore {
    /// Load the record. Absent or unreadable storage yields the default record.
    fn load(&self) -> SaveRecord;

    /// Persist the record
    fn save(&mut self, record: &SaveRecord) -> Result<()>;
}

/// Platform data directory for save and settings files
pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "mathtiles", "MathTiles")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data directory {}", dir.display()))?;
    Ok(dir)
}

/// JSON file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "save.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `save.json` in the platform data directory
    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(data_dir()?.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SaveRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let record = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(record))
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> SaveRecord {
        match self.read() {
            Ok(Some(record)) => {
                log::info!(
                    "Loaded save from {} (high score {}, {} coins)",
                    self.path.display(),
                    record.high_score,
                    record.coins
                );
                record
            }
            Ok(None) => {
                log::info!("No save at {}, starting fresh", self.path.display());
                SaveRecord::default()
            }
            Err(e) => {
                log::warn!("Unreadable save, starting fresh: {:#}", e);
                SaveRecord::default()
            }
        }
    }

    fn save(&mut self, record: &SaveRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        atomic_rename(&tmp, &self.path)?;
        log::info!(
            "Saved progress (high score {}, {} coins)",
            record.high_score,
            record.coins
        );
        Ok(())
    }
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename() does not replace an existing file on every platform
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}
