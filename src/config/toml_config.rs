use crate::domain::model::SalarySchema;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TARGET_URL: &str = "https://www.indeed.com/career/salaries";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub target: TargetConfig,
    pub selectors: SelectorConfig,
    pub labels: LabelConfig,
    pub expansion: ExpansionConfig,
    pub timeouts: TimeoutConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub browser: BrowserSettings,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
        }
    }
}

/// CSS selectors of the salary page. Company selectors are scoped to one roster item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title_input: String,
    pub location_input: String,
    pub submit: String,
    pub results_heading: String,
    pub avg_salary: String,
    pub roster_toggle: String,
    pub roster_item: String,
    pub company_name: String,
    pub company_rating: String,
    pub company_salary: String,
    pub company_reviews: String,
    pub company_salaries: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title_input: "#input-title-autocomplete".to_string(),
            location_input: "#input-location-autocomplete-localized".to_string(),
            submit: r#"button[type="submit"]"#.to_string(),
            results_heading: "h1".to_string(),
            avg_salary: r#"div[data-testid="avg-salary-value"]"#.to_string(),
            roster_toggle: r#"button[data-a11y-tabtest="top-paying-load-more-button"]"#.to_string(),
            roster_item: r#"li[data-tn-element="ranked-list-item"]"#.to_string(),
            company_name: r#"a[data-tn-element="top-paying-company-acme"]"#.to_string(),
            company_rating: r#"a[data-tn-element="top-paying-company-reviews"] span"#.to_string(),
            company_salary: r#"strong[data-testid="top-company-salary"]"#.to_string(),
            company_reviews: r#"a[data-tn-element="top-paying-company-tagline-reviews"]"#.to_string(),
            company_salaries: r#"a[data-tn-element="top-paying-company-tagline-salaries"]"#.to_string(),
        }
    }
}

impl SelectorConfig {
    fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("selectors.title_input", &self.title_input),
            ("selectors.location_input", &self.location_input),
            ("selectors.submit", &self.submit),
            ("selectors.results_heading", &self.results_heading),
            ("selectors.avg_salary", &self.avg_salary),
            ("selectors.roster_toggle", &self.roster_toggle),
            ("selectors.roster_item", &self.roster_item),
            ("selectors.company_name", &self.company_name),
            ("selectors.company_rating", &self.company_rating),
            ("selectors.company_salary", &self.company_salary),
            ("selectors.company_reviews", &self.company_reviews),
            ("selectors.company_salaries", &self.company_salaries),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub low: String,
    pub high: String,
    pub toggle_terminal: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            low: "Low".to_string(),
            high: "High".to_string(),
            toggle_terminal: "Show less".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub max_clicks: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_clicks: crate::core::expander::DEFAULT_MAX_CLICKS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub navigation_secs: u64,
    pub input_secs: u64,
    pub results_secs: u64,
    pub settle_millis: u64,
    pub query_deadline_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation_secs: 30,
            input_secs: 10,
            results_secs: 30,
            settle_millis: 1500,
            query_deadline_secs: None,
        }
    }
}

impl TimeoutConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }

    pub fn input(&self) -> Duration {
        Duration::from_secs(self.input_secs)
    }

    pub fn results(&self) -> Duration {
        Duration::from_secs(self.results_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn query_deadline(&self) -> Option<Duration> {
        self.query_deadline_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    /// 原始行為會把第一列當作資料，因此預設為 false
    pub has_header: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "queries.csv".to_string(),
            has_header: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub salary_sink: String,
    pub company_sink: String,
    pub legacy_salary_schema: bool,
    pub report: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            salary_sink: "salaries.csv".to_string(),
            company_sink: "top_companies.csv".to_string(),
            legacy_salary_schema: false,
            report: None,
        }
    }
}

impl OutputConfig {
    pub fn salary_schema(&self) -> SalarySchema {
        if self.legacy_salary_schema {
            SalarySchema::Legacy
        } else {
            SalarySchema::Canonical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub executable: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl ScrapeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("target.url", &self.target.url)?;

        for (field, selector) in self.selectors.entries() {
            validation::validate_non_empty_string(field, selector)?;
        }
        validation::validate_non_empty_string("labels.low", &self.labels.low)?;
        validation::validate_non_empty_string("labels.high", &self.labels.high)?;
        validation::validate_non_empty_string("labels.toggle_terminal", &self.labels.toggle_terminal)?;

        validation::validate_range("expansion.max_clicks", self.expansion.max_clicks, 1, 10)?;

        validation::validate_positive_number("timeouts.navigation_secs", self.timeouts.navigation_secs as usize, 1)?;
        validation::validate_positive_number("timeouts.input_secs", self.timeouts.input_secs as usize, 1)?;
        validation::validate_positive_number("timeouts.results_secs", self.timeouts.results_secs as usize, 1)?;
        validation::validate_positive_number("timeouts.settle_millis", self.timeouts.settle_millis as usize, 1)?;
        if let Some(deadline) = self.timeouts.query_deadline_secs {
            validation::validate_positive_number("timeouts.query_deadline_secs", deadline as usize, 1)?;
        }

        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &["csv", "tsv"])?;

        validation::validate_path("output.dir", &self.output.dir)?;
        validation::validate_path("output.salary_sink", &self.output.salary_sink)?;
        validation::validate_path("output.company_sink", &self.output.company_sink)?;
        if self.output.salary_sink == self.output.company_sink {
            return Err(ScrapeError::InvalidConfigValueError {
                field: "output.company_sink".to_string(),
                value: self.output.company_sink.clone(),
                reason: "Salary and company sinks must be different files".to_string(),
            });
        }
        if let Some(report) = &self.output.report {
            validation::validate_path("output.report", report)?;
        }

        Ok(())
    }
}
