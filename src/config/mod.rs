pub mod toml_config;

pub use toml_config::ScrapeConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "salary-scrape")]
#[command(about = "Collects salary statistics and top-paying companies for (job title, location) pairs")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Two-column CSV/TSV file of job title and location
    #[arg(short, long)]
    pub input: Option<String>,

    /// Treat the first input row as a header and skip it
    #[arg(long)]
    pub has_header: bool,

    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(long)]
    pub salary_sink: Option<String>,

    #[arg(long)]
    pub company_sink: Option<String>,

    /// Write the three-column salary layout (title, location, average)
    #[arg(long)]
    pub legacy_salary_schema: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the Chrome/Chromium executable
    #[arg(long)]
    pub chrome: Option<String>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, help = "Log memory and CPU usage after every query")]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Read the queries and show the plan without launching a browser
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入 TOML（若有指定），再套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if self.has_header {
            config.input.has_header = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(sink) = &self.salary_sink {
            config.output.salary_sink = sink.clone();
        }
        if let Some(sink) = &self.company_sink {
            config.output.company_sink = sink.clone();
        }
        if self.legacy_salary_schema {
            config.output.legacy_salary_schema = true;
        }
        if let Some(report) = &self.report {
            config.output.report = Some(report.clone());
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(chrome) = &self.chrome {
            config.browser.executable = Some(chrome.clone());
        }
        if self.monitor {
            config.monitoring = Some(toml_config::MonitoringConfig { enabled: true });
        }

        Ok(config)
    }
}
