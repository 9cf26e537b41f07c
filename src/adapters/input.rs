use crate::domain::model::SearchQuery;
use crate::domain::ports::QuerySource;
use crate::utils::error::{Result, ScrapeError};
use std::path::{Path, PathBuf};

/// Two-column (job title, location) file. Every row is data unless `has_header` is set.
#[derive(Debug, Clone)]
pub struct CsvQuerySource {
    path: PathBuf,
    has_header: bool,
}

impl CsvQuerySource {
    pub fn new(path: impl Into<PathBuf>, has_header: bool) -> Self {
        Self {
            path: path.into(),
            has_header,
        }
    }

    fn delimiter(&self) -> u8 {
        let is_tsv = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false);
        if is_tsv {
            b'\t'
        } else {
            b','
        }
    }

    fn error(&self, message: impl Into<String>) -> ScrapeError {
        ScrapeError::SourceError {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn read_sync(&self) -> Result<Vec<SearchQuery>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .delimiter(self.delimiter())
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(Path::new(&self.path))
            .map_err(|e| self.error(e.to_string()))?;

        let mut queries = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| self.error(e.to_string()))?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            if record.len() != 2 {
                return Err(self.error(format!(
                    "row {} has {} columns, expected job title and location",
                    index + 1,
                    record.len()
                )));
            }
            if record[0].is_empty() || record[1].is_empty() {
                return Err(self.error(format!(
                    "row {} has an empty job title or location",
                    index + 1
                )));
            }
            queries.push(SearchQuery::new(&record[0], &record[1]));
        }
        Ok(queries)
    }
}

impl QuerySource for CsvQuerySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_queries(&self) -> Result<Vec<SearchQuery>> {
        self.read_sync()
    }
}
