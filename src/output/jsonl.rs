//! Newline-delimited JSON record sink

use crate::output::{RecordSink, SinkResult};
use crate::record::CompanyRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one self-describing JSON object per line, never rewriting in
/// place
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    /// Opens the sink, creating the file if needed
    pub fn open(path: &Path) -> SinkResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonlSink {
    fn append(&mut self, record: &CompanyRecord) -> SinkResult<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        self.file.sync_data()?;

        tracing::debug!(
            "Appended record for {} to {}",
            record.identity.org_number.as_deref().unwrap_or("?"),
            self.path.display()
        );
        Ok(())
    }
}
