use crate::config::toml_config::{LabelConfig, ScrapeConfig, SelectorConfig, TimeoutConfig};
use crate::core::expander::ListExpander;
use crate::core::extractor::{Extractor, FallbackExtractor};
use crate::domain::model::{CompanyRecord, QueryResult, SalaryRecord, SearchQuery, NO_RATING};
use crate::domain::ports::{BrowserContext, DomNode, PageScope};
use crate::utils::error::{Result, ScrapeError};
use std::time::Duration;

const NAVIGATION_POLL: Duration = Duration::from_millis(100);

/// Fields a roster entry exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Rating,
    AvgSalary,
    NumReviews,
    NumSalariesReported,
}

impl CompanyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyField::Name => "company_name",
            CompanyField::Rating => "rating",
            CompanyField::AvgSalary => "avg_salary",
            CompanyField::NumReviews => "num_reviews",
            CompanyField::NumSalariesReported => "num_salaries_reported",
        }
    }

    fn selector<'s>(&self, selectors: &'s SelectorConfig) -> &'s str {
        match self {
            CompanyField::Name => &selectors.company_name,
            CompanyField::Rating => &selectors.company_rating,
            CompanyField::AvgSalary => &selectors.company_salary,
            CompanyField::NumReviews => &selectors.company_reviews,
            CompanyField::NumSalariesReported => &selectors.company_salaries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Record(CompanyRecord),
    /// A mandatory field was absent; the entry is dropped and the roster continues.
    Skipped { missing: CompanyField },
}

/// One roster item, read field by field.
pub struct RosterEntry<'a, N: DomNode> {
    node: N,
    selectors: &'a SelectorConfig,
}

impl<'a, N: DomNode> RosterEntry<'a, N> {
    pub fn new(node: N, selectors: &'a SelectorConfig) -> Self {
        Self { node, selectors }
    }

    pub async fn query_field(&self, field: CompanyField) -> Result<Option<String>> {
        Ok(Extractor::get(&self.node, field.selector(self.selectors))
            .await?
            .filter(|value| !value.is_empty()))
    }

    /// name 與 avg_salary 為必要欄位；rating 缺少時代表公司沒有評論
    pub async fn into_outcome(self, query: &SearchQuery) -> Result<EntryOutcome> {
        let name = match self.query_field(CompanyField::Name).await? {
            Some(name) => name,
            None => return Ok(EntryOutcome::Skipped { missing: CompanyField::Name }),
        };
        let avg_salary = match self.query_field(CompanyField::AvgSalary).await? {
            Some(salary) => salary,
            None => return Ok(EntryOutcome::Skipped { missing: CompanyField::AvgSalary }),
        };
        let rating = self
            .query_field(CompanyField::Rating)
            .await?
            .unwrap_or_else(|| NO_RATING.to_string());
        let num_reviews = self.query_field(CompanyField::NumReviews).await?.unwrap_or_default();
        let num_salaries_reported = self
            .query_field(CompanyField::NumSalariesReported)
            .await?
            .unwrap_or_default();

        Ok(EntryOutcome::Record(CompanyRecord {
            job_title: query.job_title.clone(),
            location: query.location.clone(),
            name,
            rating,
            avg_salary,
            num_reviews,
            num_salaries_reported,
        }))
    }
}

/// True when the heading names both the job title and the location, ignoring case.
/// An empty title or location never matches.
pub fn heading_matches(heading: &str, query: &SearchQuery) -> bool {
    let title = query.job_title.trim().to_lowercase();
    let location = query.location.trim().to_lowercase();
    if title.is_empty() || location.is_empty() {
        return false;
    }
    let heading = heading.to_lowercase();
    heading.contains(&title) && heading.contains(&location)
}

/// Runs a single query in its own page scope.
pub struct SearchSession {
    target_url: String,
    selectors: SelectorConfig,
    labels: LabelConfig,
    timeouts: TimeoutConfig,
    expander: ListExpander,
}

impl SearchSession {
    pub fn new(config: &ScrapeConfig) -> Self {
        let expander = ListExpander::new(
            config.selectors.roster_toggle.clone(),
            config.labels.toggle_terminal.clone(),
        )
        .with_max_clicks(config.expansion.max_clicks)
        .with_settle(config.timeouts.settle());

        Self {
            target_url: config.target.url.clone(),
            selectors: config.selectors.clone(),
            labels: config.labels.clone(),
            timeouts: config.timeouts.clone(),
            expander,
        }
    }

    /// The page scope is closed on every path before the result is returned.
    pub async fn execute<B: BrowserContext>(&self, browser: &B, query: &SearchQuery) -> Result<QueryResult> {
        let page = browser.open_page().await?;

        let result = match self.timeouts.query_deadline() {
            Some(deadline) => tokio::time::timeout(deadline, self.drive(&page, query))
                .await
                .unwrap_or_else(|_| Err(ScrapeError::timeout(format!("query {}", query), deadline))),
            None => self.drive(&page, query).await,
        };

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page for {}: {}", query, e);
        }
        result
    }

    async fn drive<P: PageScope>(&self, page: &P, query: &SearchQuery) -> Result<QueryResult> {
        self.submit_search(page, query).await?;

        let root = page.root().await?;
        self.validate_results(&root, query).await?;

        let salary = self.extract_salary(&root, query).await?;

        let expansion = self.expander.expand(&root).await?;
        tracing::debug!("Roster expansion for {}: {:?}", query, expansion);

        let companies = self.extract_roster(&root, query).await?;

        Ok(QueryResult { salary, companies })
    }

    async fn submit_search<P: PageScope>(&self, page: &P, query: &SearchQuery) -> Result<()> {
        let limit = self.timeouts.navigation();
        match tokio::time::timeout(limit, page.goto(&self.target_url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ScrapeError::navigation(format!(
                    "could not load {}: {}",
                    self.target_url, e
                )))
            }
            Err(_) => {
                return Err(ScrapeError::navigation(format!(
                    "timed out after {:?} loading {}",
                    limit, self.target_url
                )))
            }
        }

        let title_input = self.wait_for_control(page, &self.selectors.title_input).await?;
        let location_input = self.wait_for_control(page, &self.selectors.location_input).await?;

        title_input.fill(&query.job_title).await?;

        // 地點欄位預設有值，必須先全選刪除再輸入
        location_input.clear().await?;
        location_input.fill(&query.location).await?;

        let submit = self.wait_for_control(page, &self.selectors.submit).await?;
        let form_url = page.url().await?.unwrap_or_default();
        submit.click().await?;

        let limit = self.timeouts.results();
        match tokio::time::timeout(limit, self.await_results(page, &form_url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::navigation(format!("results page failed to load: {}", e))),
            Err(_) => Err(ScrapeError::navigation(format!(
                "results page not rendered after {:?}",
                limit
            ))),
        }
    }

    /// 點擊後表單頁仍是已載入狀態，必須先等網址離開表單頁，再等新頁面載入完成
    async fn await_results<P: PageScope>(&self, page: &P, form_url: &str) -> Result<()> {
        loop {
            match page.url().await? {
                Some(url) if url != form_url => break,
                _ => tokio::time::sleep(NAVIGATION_POLL).await,
            }
        }
        page.wait_for_navigation().await
    }

    async fn wait_for_control<P: PageScope>(&self, page: &P, selector: &str) -> Result<P::Node> {
        let limit = self.timeouts.input();
        match tokio::time::timeout(limit, page.wait_for(selector)).await {
            Ok(result) => result.map_err(|e| ScrapeError::input(format!("'{}': {}", selector, e))),
            Err(_) => Err(ScrapeError::input(format!(
                "'{}' not ready after {:?}",
                selector, limit
            ))),
        }
    }

    async fn validate_results<N: DomNode>(&self, root: &N, query: &SearchQuery) -> Result<()> {
        let heading = Extractor::get(root, &self.selectors.results_heading)
            .await?
            .ok_or_else(|| ScrapeError::validation("results heading not found"))?;

        if !heading_matches(&heading, query) {
            return Err(ScrapeError::validation(format!(
                "heading '{}' does not mention {}",
                heading, query
            )));
        }
        Ok(())
    }

    async fn extract_salary<N: DomNode>(&self, root: &N, query: &SearchQuery) -> Result<SalaryRecord> {
        let avg = Extractor::get(root, &self.selectors.avg_salary)
            .await?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ScrapeError::extraction("avg_salary"))?;

        let low = FallbackExtractor::get_or_sentinel(root, &self.labels.low).await?;
        let high = FallbackExtractor::get_or_sentinel(root, &self.labels.high).await?;

        Ok(SalaryRecord {
            job_title: query.job_title.clone(),
            location: query.location.clone(),
            low,
            avg,
            high,
        })
    }

    async fn extract_roster<N: DomNode>(&self, root: &N, query: &SearchQuery) -> Result<Vec<CompanyRecord>> {
        let items = root.query_all(&self.selectors.roster_item).await?;
        if items.is_empty() {
            return Err(ScrapeError::validation("no listings found"));
        }

        let total = items.len();
        let mut companies = Vec::with_capacity(total);
        for (index, node) in items.into_iter().enumerate() {
            match RosterEntry::new(node, &self.selectors).into_outcome(query).await {
                Ok(EntryOutcome::Record(company)) => {
                    tracing::debug!(
                        "Company {}: rating={}, salary={}, reviews={}, salaries={}",
                        company.name,
                        company.rating,
                        company.avg_salary,
                        company.num_reviews,
                        company.num_salaries_reported
                    );
                    companies.push(company);
                }
                Ok(EntryOutcome::Skipped { missing }) => {
                    tracing::warn!(
                        "⚠️ Skipping roster entry {} of {} for {}: missing {}",
                        index + 1,
                        total,
                        query,
                        missing.as_str()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Skipping roster entry {} of {} for {}: {}",
                        index + 1,
                        total,
                        query,
                        e
                    );
                }
            }
        }

        Ok(companies)
    }
}
