//! Record stores hold the encoded ledger between runs.

use crate::codec::{Ledger, LoadMode, StoreFormat};
use crate::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Durable home of the ledger. `load` returns `None` when nothing was stored yet.
pub trait RecordStore {
    fn load(&self) -> Result<Option<Ledger>>;

    fn save(&mut self, ledger: &Ledger) -> Result<()>;
}

/// Single flat file, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: StoreFormat,
    load_mode: LoadMode,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, format: StoreFormat, load_mode: LoadMode) -> Self {
        Self {
            path: path.into(),
            format,
            load_mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ward-store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordStore for FileStore {
    fn load(&self) -> Result<Option<Ledger>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No store file yet, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let ledger = Ledger::decode(&text, self.load_mode)?;
        let detected = StoreFormat::detect(&text);
        if detected != self.format {
            tracing::warn!(
                path = %self.path.display(),
                stored = %detected,
                configured = %self.format,
                "Store will be rewritten in the configured format on the next change"
            );
        }
        tracing::info!(
            path = %self.path.display(),
            format = %detected,
            patients = ledger.patients.len(),
            next_patient_id = ledger.next_patient_id,
            "Loaded ward store"
        );
        Ok(Some(ledger))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<()> {
        let text = ledger.encode(self.format)?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            bytes = text.len(),
            patients = ledger.patients.len(),
            "Saved ward store"
        );
        Ok(())
    }
}

/// Keeps the encoded store in memory. Writes can be made to fail for testing
/// persistence policies.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    format: StoreFormat,
    load_mode: LoadMode,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new(format: StoreFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Start from existing store text, as if it had been read from disk.
    pub fn with_contents(contents: impl Into<String>, format: StoreFormat) -> Self {
        Self {
            contents: Some(contents.into()),
            format,
            ..Self::default()
        }
    }

    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Option<Ledger>> {
        self.contents
            .as_deref()
            .map(|text| Ledger::decode(text, self.load_mode))
            .transpose()
    }

    fn save(&mut self, ledger: &Ledger) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only").into());
        }
        self.contents = Some(ledger.encode(self.format)?);
        self.saves += 1;
        Ok(())
    }
}
