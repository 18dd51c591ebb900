/*!
 * Output directory layout
 *
 * Everything the tool writes lives under `<root>/WiFiKey`:
 * - `Log`          daily-rotated log files
 * - `Data`         the resume index (`wifi_index.json`)
 * - `WiFi_Profile` the scratch connection profile handed to the OS
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

/// Resolved output layout for one run.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub log_dir: PathBuf,
    pub data_dir: PathBuf,
    pub profile_dir: PathBuf,
}

impl Workspace {
    /// Create the layout under `base`, making any missing directories.
    pub fn init(base: &Path) -> std::io::Result<Self> {
        let root = base.join("WiFiKey");
        let ws = Workspace {
            log_dir: root.join("Log"),
            data_dir: root.join("Data"),
            profile_dir: root.join("WiFi_Profile"),
            root,
        };

        for dir in [&ws.root, &ws.log_dir, &ws.data_dir, &ws.profile_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                info!("created directory: {}", dir.display());
            }
        }

        Ok(ws)
    }
}
