/*!
 * Resume index
 *
 * `wifi_index.json` is a single JSON object: network name -> wordlist name ->
 * attempt record. It lets an interrupted run pick up at the exact wordlist
 * byte it stopped on. The field names are part of the on-disk format and are
 * shared with earlier runs, so they stay in their historical SCREAMING_CASE
 * form.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Index filename inside the data directory.
pub const INDEX_FILE: &str = "wifi_index.json";

type IndexData = BTreeMap<String, BTreeMap<String, AttemptRecord>>;

/// One persisted cursor for a (network, wordlist) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptRecord {
    #[serde(rename = "CODEBOOK_PATH")]
    pub wordlist_path: String,
    #[serde(rename = "STORAGE_TIME")]
    pub stored_at: String,
    #[serde(rename = "PREVIOUS_PASSWORD")]
    pub last_password: String,
    #[serde(rename = "CODEBOOK_SEEK")]
    pub offset: u64,
}

impl AttemptRecord {
    pub fn new(wordlist_path: &Path, last_password: &str, offset: u64) -> Self {
        AttemptRecord {
            wordlist_path: wordlist_path.display().to_string(),
            stored_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            last_password: last_password.to_string(),
            offset,
        }
    }
}

/// Resume point extracted from a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub offset: u64,
    pub last_password: String,
}

/// Persistent progress store backed by a single JSON file.
pub struct ProgressIndex {
    path: PathBuf,
}

impl ProgressIndex {
    pub fn new(data_dir: &Path) -> Self {
        ProgressIndex {
            path: data_dir.join(INDEX_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the resume point for `(network, wordlist)`.
    ///
    /// A missing index file is created empty and reported as "no record".
    /// A corrupt file is also "no record": the run degrades to starting from
    /// offset zero rather than failing.
    pub fn read(&self, network: &str, wordlist: &str) -> Option<ResumePoint> {
        if !self.path.exists() {
            if let Err(err) = fs::write(&self.path, "{}") {
                error!("failed to create index file {}: {}", self.path.display(), err);
            } else {
                info!("created resume index: {}", self.path.display());
            }
            return None;
        }

        let data = match self.load() {
            Some(data) => data,
            None => return None,
        };

        let record = data.get(network)?.get(wordlist)?;
        info!(
            "resume point for {} - {}: offset {} (last password: {})",
            network, wordlist, record.offset, record.last_password
        );
        Some(ResumePoint {
            offset: record.offset,
            last_password: record.last_password.clone(),
        })
    }

    /// Upsert the record for `(network, wordlist)`, preserving every other
    /// entry, and persist the whole index in one atomic step.
    ///
    /// Returns false without touching the file when the index on disk is
    /// unparseable or the write fails; the caller keeps running without this
    /// cursor update.
    pub fn write(&self, network: &str, wordlist: &str, record: AttemptRecord) -> bool {
        let mut data = if self.path.exists() {
            match self.load() {
                Some(data) => data,
                None => {
                    error!(
                        "refusing to overwrite unparseable index: {}",
                        self.path.display()
                    );
                    return false;
                }
            }
        } else {
            IndexData::new()
        };

        let offset = record.offset;
        data.entry(network.to_string())
            .or_default()
            .insert(wordlist.to_string(), record);

        match self.persist(&data) {
            Ok(()) => {
                debug!("updated {} - {} cursor: {}", network, wordlist, offset);
                true
            }
            Err(err) => {
                error!("failed to persist index {}: {}", self.path.display(), err);
                false
            }
        }
    }

    fn load(&self) -> Option<IndexData> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                error!("failed to read index {}: {}", self.path.display(), err);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(data) => Some(data),
            Err(err) => {
                error!("corrupt index {}: {}", self.path.display(), err);
                None
            }
        }
    }

    /// All-or-nothing write: serialize to a sibling temp file, then rename
    /// over the index so an interrupt never leaves a half-written entry.
    fn persist(&self, data: &IndexData) -> std::io::Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)
    }
}
