use crate::utils::error::{ErrorKind, ScrapeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 無法取得 low/high 時寫入的佔位值
pub const NOT_FOUND: &str = "Error: Not found";

/// 公司沒有評分元素時的預設值
pub const NO_RATING: &str = "No rating";

pub const SALARY_HEADER: [&str; 5] = [
    "Job Title",
    "Search Location",
    "Low Base Salary",
    "Average Base Salary",
    "High Base Salary",
];

pub const LEGACY_SALARY_HEADER: [&str; 3] = ["Job Title", "Search Location", "Average Base Salary"];

pub const COMPANY_HEADER: [&str; 7] = [
    "Job Title",
    "Search Location",
    "Company Name",
    "Aggregate Rating",
    "Average Salary",
    "Number of Reviews",
    "Salaries Reported",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub job_title: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(job_title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
        }
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' in '{}'", self.job_title, self.location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub job_title: String,
    pub location: String,
    pub low: String,
    pub avg: String,
    pub high: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub job_title: String,
    pub location: String,
    pub name: String,
    pub rating: String,
    pub avg_salary: String,
    pub num_reviews: String,
    pub num_salaries_reported: String,
}

impl CompanyRecord {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.job_title.clone(),
            self.location.clone(),
            self.name.clone(),
            self.rating.clone(),
            self.avg_salary.clone(),
            self.num_reviews.clone(),
            self.num_salaries_reported.clone(),
        ]
    }
}

/// Column layout of the salary sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalarySchema {
    #[default]
    Canonical,
    Legacy,
}

impl SalarySchema {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            SalarySchema::Canonical => &SALARY_HEADER,
            SalarySchema::Legacy => &LEGACY_SALARY_HEADER,
        }
    }

    pub fn row(&self, record: &SalaryRecord) -> Vec<String> {
        match self {
            SalarySchema::Canonical => vec![
                record.job_title.clone(),
                record.location.clone(),
                record.low.clone(),
                record.avg.clone(),
                record.high.clone(),
            ],
            SalarySchema::Legacy => vec![
                record.job_title.clone(),
                record.location.clone(),
                record.avg.clone(),
            ],
        }
    }
}

/// 單一查詢成功時的產出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub salary: SalaryRecord,
    pub companies: Vec<CompanyRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub query: SearchQuery,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub companies: usize,
}

impl RunOutcome {
    pub fn success(query: SearchQuery, companies: usize) -> Self {
        Self {
            query,
            status: OutcomeStatus::Success,
            error_kind: None,
            message: None,
            companies,
        }
    }

    pub fn failure(query: SearchQuery, error: &ScrapeError) -> Self {
        Self {
            query,
            status: OutcomeStatus::Failure,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
            companies: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// 整個批次的執行報告，只記錄於日誌或 JSON 檔，不寫入 sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<RunOutcome>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: RunOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn to_json(&self) -> crate::utils::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::utils::error::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
