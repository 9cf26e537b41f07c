use crate::domain::ports::TabularWriter;
use crate::utils::error::Result;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// CSV sinks under a base directory. Every row is opened, appended and flushed on its own.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    base_path: PathBuf,
}

impl CsvStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl TabularWriter for CsvStorage {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }

    async fn append_row(&self, path: &str, row: &[String]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&full_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }
}
