use crate::config::toml_config::ScrapeConfig;
use crate::core::emitter::{RecordEmitter, SinkState};
use crate::core::session::SearchSession;
use crate::domain::model::{QueryResult, RunOutcome, RunReport, SalarySchema, SearchQuery, COMPANY_HEADER};
use crate::domain::ports::{BrowserContext, BrowserLauncher, QuerySource, TabularWriter};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives the whole batch: one query at a time, failures isolated per query.
pub struct BatchRunner<W: TabularWriter> {
    session: SearchSession,
    emitter: RecordEmitter<W>,
    schema: SalarySchema,
    salary_sink: SinkState,
    company_sink: SinkState,
    monitor: SystemMonitor,
}

impl<W: TabularWriter> BatchRunner<W> {
    /// 建立時即取得兩個 sink，header 是否要寫只依此刻檔案是否存在決定
    pub fn new(config: &ScrapeConfig, writer: W) -> Self {
        let emitter = RecordEmitter::new(writer);
        let salary_sink = emitter.acquire(config.output.salary_sink.clone());
        let company_sink = emitter.acquire(config.output.company_sink.clone());

        Self {
            session: SearchSession::new(config),
            emitter,
            schema: config.output.salary_schema(),
            salary_sink,
            company_sink,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub fn emitter(&self) -> &RecordEmitter<W> {
        &self.emitter
    }

    /// Launches the browser, reads the queries and runs them. The browser is closed
    /// exactly once whether the source could be read or not.
    pub async fn run_with<L, Q>(&mut self, launcher: &L, source: &Q) -> Result<RunReport>
    where
        L: BrowserLauncher,
        Q: QuerySource,
    {
        let browser = launcher.launch().await?;
        tracing::info!("🌐 Browser launched");

        let report = match source.read_queries().await {
            Ok(queries) => {
                tracing::info!("📋 Loaded {} queries from {}", queries.len(), source.describe());
                Ok(self.run(&browser, queries).await)
            }
            Err(e) => {
                tracing::error!("❌ Could not read queries from {}: {}", source.describe(), e);
                Err(e)
            }
        };

        match browser.close().await {
            Ok(()) => tracing::info!("🌐 Browser closed"),
            Err(e) => tracing::warn!("Browser did not close cleanly: {}", e),
        }

        report
    }

    pub async fn run<B: BrowserContext>(&mut self, browser: &B, queries: Vec<SearchQuery>) -> RunReport {
        let mut report = RunReport::start();
        let total = queries.len();

        for (index, query) in queries.into_iter().enumerate() {
            tracing::info!("🔍 [{}/{}] Searching {}", index + 1, total, query);

            let outcome = match self.session.execute(browser, &query).await {
                Ok(result) => match self.persist(&result).await {
                    Ok(()) => {
                        tracing::info!(
                            "✅ [{}/{}] avg {} with {} companies",
                            index + 1,
                            total,
                            result.salary.avg,
                            result.companies.len()
                        );
                        RunOutcome::success(query, result.companies.len())
                    }
                    Err(e) => {
                        tracing::error!("❌ [{}/{}] Could not write results for {}: {}", index + 1, total, query, e);
                        RunOutcome::failure(query, &e)
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "❌ [{}/{}] {} failed ({:?}): {}",
                        index + 1,
                        total,
                        query,
                        e.kind(),
                        e
                    );
                    tracing::debug!("💡 {}", e.recovery_suggestion());
                    RunOutcome::failure(query, &e)
                }
            };
            report.record(outcome);

            self.monitor.log_stats(&format!("query {}/{}", index + 1, total));
        }

        report.finish();
        tracing::info!(
            "🏁 Run finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        self.monitor.log_final_stats();
        report
    }

    /// Salary row first, then the company rows of the same query.
    async fn persist(&mut self, result: &QueryResult) -> Result<()> {
        let salary_row = self.schema.row(&result.salary);
        self.emitter
            .append(&mut self.salary_sink, self.schema.header(), &salary_row)
            .await?;

        for company in &result.companies {
            self.emitter
                .append(&mut self.company_sink, &COMPANY_HEADER, &company.to_row())
                .await?;
        }
        Ok(())
    }
}
