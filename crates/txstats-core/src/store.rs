//! Date-keyed snapshot files on local disk.
//!
//! One JSON file per day, named `YYYY-MM-DD.json`, all in a single directory.
//! Writes go through a temporary file in the same directory so readers never
//! observe a half-written snapshot.

use chrono::NaiveDate;
use std::ffi::OsStr;
use std::fs;
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use txstats_common::{
    parse_snapshot_date, snapshot_file_name, Result, Snapshot, TxError, SNAPSHOT_EXTENSION,
};

/// The two snapshots a report compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPair {
    /// Date of the most recent snapshot.
    pub latest_date: NaiveDate,
    /// Most recent snapshot.
    pub latest: Snapshot,
    /// Date of the snapshot compared against.
    pub reference_date: NaiveDate,
    /// Snapshot compared against.
    pub reference: Snapshot,
}

impl ComparisonPair {
    /// Calendar days between the two snapshots.
    pub fn span_days(&self) -> u32 {
        let days = (self.latest_date - self.reference_date).num_days();
        u32::try_from(days).unwrap_or(0)
    }
}

/// Snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the snapshot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path of the snapshot for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root.join(snapshot_file_name(date))
    }

    /// Persists `snapshot` as the file for `date`, replacing any earlier one.
    #[instrument(skip(self, snapshot), fields(resources = snapshot.len()))]
    pub fn write_snapshot(&self, snapshot: &Snapshot, date: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| {
            TxError::store_write("Failed to create snapshot directory", &self.root, e)
        })?;

        let path = self.path_for(date);
        let temp = NamedTempFile::new_in(&self.root)
            .map_err(|e| TxError::store_write("Failed to create temporary file", &self.root, e))?;

        let mut writer = BufWriter::new(temp);
        serde_json::to_writer(&mut writer, snapshot)
            .map_err(|e| TxError::store_write("Failed to encode snapshot", &path, e))?;
        let temp = writer
            .into_inner()
            .map_err(|e| TxError::store_write("Failed to flush snapshot", &path, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| TxError::store_write("Failed to sync snapshot", &path, e))?;

        temp.persist(&path)
            .map_err(|e| TxError::store_write("Failed to move snapshot into place", &path, e.error))?;

        info!("Saved snapshot {}", path.display());
        Ok(path)
    }

    /// Dates of all stored snapshots, newest first.
    ///
    /// Files whose name is not a date or whose extension is not `json` are
    /// ignored. A missing directory holds no snapshots.
    pub fn list_snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Snapshot directory {} does not exist yet", self.root.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(TxError::store_read(
                    "Failed to list snapshot directory",
                    &self.root,
                    e,
                ))
            }
        };

        let mut dates: Vec<NaiveDate> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| snapshot_date_of(&entry.path()))
            .collect();

        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }

    /// Reads the snapshot stored for `date`.
    pub fn read_snapshot(&self, date: NaiveDate) -> Result<Snapshot> {
        let path = self.path_for(date);
        let content = fs::read_to_string(&path)
            .map_err(|e| TxError::store_read("Failed to read snapshot", &path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| TxError::store_read("Snapshot file is corrupt", &path, e))
    }

    /// Picks the latest snapshot and the one `window_days` positions older.
    ///
    /// Positions count stored snapshots, not calendar days. With fewer than
    /// `window_days + 1` snapshots the oldest one is the reference; with a
    /// single snapshot both sides are the same file.
    #[instrument(skip(self))]
    pub fn select_comparison_pair(&self, window_days: u32) -> Result<ComparisonPair> {
        let dates = self.list_snapshot_dates()?;

        let latest_date = *dates.first().ok_or_else(|| {
            TxError::store_read_msg(format!("No snapshots found in {}", self.root.display()))
        })?;

        let offset = usize::try_from(window_days).unwrap_or(usize::MAX);
        let reference_date = match dates.get(offset) {
            Some(date) => *date,
            None => {
                let oldest = dates.last().copied().unwrap_or(latest_date);
                warn!(
                    available = dates.len(),
                    "Fewer snapshots than the report window, comparing against {}", oldest
                );
                oldest
            }
        };

        debug!("Comparing {} against {}", latest_date, reference_date);

        Ok(ComparisonPair {
            latest_date,
            latest: self.read_snapshot(latest_date)?,
            reference_date,
            reference: self.read_snapshot(reference_date)?,
        })
    }
}

fn snapshot_date_of(path: &Path) -> Option<NaiveDate> {
    if path.extension().and_then(OsStr::to_str) != Some(SNAPSHOT_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(OsStr::to_str)
        .and_then(parse_snapshot_date)
}
