//! Research agent report storage adapter.
//!
//! [`FsReportStore`] writes finished reports under a configured directory,
//! creating it on first use. Saving a filename that already exists replaces
//! the earlier report.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use pipeline::{ProviderError, ReportLocation, ReportStore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// The `[output]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolves `filename` inside the store directory.
    ///
    /// Only a single plain path component is accepted.
    fn target(&self, filename: &str) -> Result<PathBuf, ProviderError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.dir.join(name)),
            _ => Err(ProviderError::Io(format!(
                "refusing to write '{filename}': not a plain file name"
            ))),
        }
    }
}

fn io_error(action: &str, path: &Path, err: io::Error) -> ProviderError {
    ProviderError::Io(format!("{action} {}: {err}", path.display()))
}

#[async_trait]
impl ReportStore for FsReportStore {
    #[instrument(skip(self, content), fields(dir = %self.dir.display(), bytes = content.len()))]
    async fn save(&self, content: &str, filename: &str) -> Result<ReportLocation, ProviderError> {
        let path = self.target(filename)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("creating", &self.dir, e))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| io_error("writing", &path, e))?;

        info!(path = %path.display(), "report saved");
        ReportLocation::new(path.display().to_string())
            .ok_or_else(|| ProviderError::Io("report path is empty".into()))
    }
}
