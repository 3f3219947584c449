use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;

use crate::types::AnalyticsRecord;

/// Append-only JSON-lines log of successful checks. Writes never fail the
/// request that triggered them.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsLog {
    path: Option<PathBuf>,
}

impl AnalyticsLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn record(&self, record: &AnalyticsRecord) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(error) = append_line(path, record).await {
            debug!(path = %path.display(), ?error, "analytics write skipped");
        }
    }
}

async fn append_line(path: &Path, record: &AnalyticsRecord) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
