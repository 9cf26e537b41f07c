#![allow(dead_code)]

use async_trait::async_trait;
use salary_scrape::config::toml_config::SelectorConfig;
use salary_scrape::domain::model::SearchQuery;
use salary_scrape::domain::ports::{
    BrowserContext, BrowserLauncher, DomNode, PageScope, QuerySource, TabularWriter,
};
use salary_scrape::utils::error::{Result, ScrapeError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const FORM_URL: &str = "https://salaries.test/career/salaries";
pub const RESULTS_URL: &str = "https://salaries.test/career/results";
pub const FORM_HEADING: &str = "Find salaries";

#[derive(Debug, Clone, Default)]
pub struct CompanyFixture {
    pub name: Option<String>,
    pub rating: Option<String>,
    pub salary: Option<String>,
    pub reviews: Option<String>,
    pub salaries: Option<String>,
    /// Every lookup inside this entry fails, as a detached node would.
    pub stale: bool,
}

impl CompanyFixture {
    pub fn full(name: &str, rating: &str, salary: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            rating: Some(rating.to_string()),
            salary: Some(salary.to_string()),
            reviews: Some("120 reviews".to_string()),
            salaries: Some("45 salaries reported".to_string()),
            stale: false,
        }
    }
}

/// What one results page looks like.
#[derive(Debug, Clone)]
pub struct PageScript {
    pub heading: Option<String>,
    pub avg: Option<String>,
    pub label_texts: Vec<String>,
    pub roster: Vec<CompanyFixture>,
    /// Entries shown initially and revealed per toggle click; 0 shows everything without a toggle.
    pub page_size: usize,
    pub stuck_toggle: bool,
    pub inputs_ready: bool,
    pub navigation_fails: bool,
    /// Time between the submit click and the results document replacing the form.
    /// `None` means the submit never leads anywhere.
    pub results_delay: Option<Duration>,
}

impl PageScript {
    pub fn results(query: &SearchQuery, avg: &str, roster: Vec<CompanyFixture>) -> Self {
        Self {
            heading: Some(format!("{} Salaries in {}", query.job_title, query.location)),
            avg: Some(avg.to_string()),
            label_texts: Vec::new(),
            roster,
            page_size: 0,
            stuck_toggle: false,
            inputs_ready: true,
            navigation_fails: false,
            results_delay: Some(Duration::ZERO),
        }
    }

    pub fn with_heading(mut self, heading: &str) -> Self {
        self.heading = Some(heading.to_string());
        self
    }

    pub fn with_label_text(mut self, text: &str) -> Self {
        self.label_texts.push(text.to_string());
        self
    }

    pub fn with_results_delay(mut self, delay: Option<Duration>) -> Self {
        self.results_delay = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

pub fn companies(count: usize) -> Vec<CompanyFixture> {
    (1..=count)
        .map(|i| CompanyFixture::full(&format!("Company {}", i), "4.0", &format!("${},000 per year", 60 + i)))
        .collect()
}

#[derive(Default)]
pub struct BrowserStats {
    pub launched: AtomicUsize,
    pub released: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub toggle_clicks: AtomicUsize,
    pub typed: Mutex<Vec<(String, String)>>,
    pub cleared: Mutex<Vec<String>>,
}

impl BrowserStats {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakeLauncher {
    pages: Vec<PageScript>,
    fail: bool,
    pub stats: Arc<BrowserStats>,
}

impl FakeLauncher {
    pub fn new(pages: Vec<PageScript>) -> Self {
        Self {
            pages,
            fail: false,
            stats: Arc::new(BrowserStats::default()),
        }
    }

    pub fn failing() -> Self {
        Self {
            pages: Vec::new(),
            fail: true,
            stats: Arc::new(BrowserStats::default()),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Browser = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser> {
        self.stats.launched.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ScrapeError::browser("no chrome installed"));
        }
        Ok(FakeBrowser::new(self.pages.clone(), self.stats.clone()))
    }
}

pub struct FakeBrowser {
    pages: Mutex<VecDeque<PageScript>>,
    pub stats: Arc<BrowserStats>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<PageScript>, stats: Arc<BrowserStats>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            stats,
        }
    }
}

#[async_trait]
impl BrowserContext for FakeBrowser {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage> {
        let script = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScrapeError::browser("no more scripted pages"))?;
        self.stats.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            state: Arc::new(PageState {
                script,
                selectors: SelectorConfig::default(),
                clicks: AtomicUsize::new(0),
                submitted_at: Mutex::new(None),
                stats: self.stats.clone(),
            }),
        })
    }

    async fn close(self) -> Result<()> {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct PageState {
    script: PageScript,
    selectors: SelectorConfig,
    clicks: AtomicUsize,
    submitted_at: Mutex<Option<Instant>>,
    stats: Arc<BrowserStats>,
}

impl PageState {
    /// Whether the results document has replaced the search form.
    fn on_results(&self) -> bool {
        match (*self.submitted_at.lock().unwrap(), self.script.results_delay) {
            (Some(at), Some(delay)) => at.elapsed() >= delay,
            _ => false,
        }
    }

    fn visible(&self) -> usize {
        let total = self.script.roster.len();
        if self.script.page_size == 0 {
            return total;
        }
        let shown = self.script.page_size * (1 + self.clicks.load(Ordering::SeqCst));
        shown.min(total)
    }

    fn has_toggle(&self) -> bool {
        self.script.page_size > 0 && self.script.roster.len() > self.script.page_size
    }

    fn toggle_label(&self) -> &'static str {
        if !self.script.stuck_toggle && self.visible() >= self.script.roster.len() {
            "Show less"
        } else {
            "Show more"
        }
    }
}

pub struct FakePage {
    state: Arc<PageState>,
}

#[async_trait]
impl PageScope for FakePage {
    type Node = FakeNode;

    async fn goto(&self, url: &str) -> Result<()> {
        if self.state.script.navigation_fails {
            return Err(ScrapeError::browser(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> Result<FakeNode> {
        if !self.state.script.inputs_ready {
            std::future::pending::<()>().await;
        }
        Ok(FakeNode::Control(self.state.clone(), selector.to_string()))
    }

    // the current document is always loaded, whichever one it is
    async fn wait_for_navigation(&self) -> Result<()> {
        Ok(())
    }

    async fn url(&self) -> Result<Option<String>> {
        let url = if self.state.on_results() { RESULTS_URL } else { FORM_URL };
        Ok(Some(url.to_string()))
    }

    async fn root(&self) -> Result<FakeNode> {
        Ok(FakeNode::Root(self.state.clone()))
    }

    async fn close(self) -> Result<()> {
        self.state.stats.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub enum FakeNode {
    Root(Arc<PageState>),
    Control(Arc<PageState>, String),
    Toggle(Arc<PageState>),
    Entry(Arc<PageState>, usize),
    Text(String),
}

fn text_node(value: &Option<String>) -> Option<FakeNode> {
    value.as_ref().map(|v| FakeNode::Text(v.clone()))
}

#[async_trait]
impl DomNode for FakeNode {
    async fn query(&self, selector: &str) -> Result<Option<Self>> {
        match self {
            FakeNode::Root(state) if !state.on_results() => {
                if selector == state.selectors.results_heading {
                    Ok(Some(FakeNode::Text(FORM_HEADING.to_string())))
                } else {
                    Ok(None)
                }
            }
            FakeNode::Root(state) => {
                let s = &state.selectors;
                if selector == s.results_heading {
                    Ok(text_node(&state.script.heading))
                } else if selector == s.avg_salary {
                    Ok(text_node(&state.script.avg))
                } else if selector == s.roster_toggle && state.has_toggle() {
                    Ok(Some(FakeNode::Toggle(state.clone())))
                } else {
                    Ok(None)
                }
            }
            FakeNode::Entry(state, index) => {
                let s = &state.selectors;
                let company = &state.script.roster[*index];
                if company.stale {
                    return Err(ScrapeError::browser("node is detached from the document"));
                }
                let value = if selector == s.company_name {
                    &company.name
                } else if selector == s.company_rating {
                    &company.rating
                } else if selector == s.company_salary {
                    &company.salary
                } else if selector == s.company_reviews {
                    &company.reviews
                } else if selector == s.company_salaries {
                    &company.salaries
                } else {
                    return Ok(None);
                };
                Ok(text_node(value))
            }
            _ => Ok(None),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>> {
        match self {
            FakeNode::Root(state) if state.on_results() && selector == state.selectors.roster_item => Ok((0..state.visible())
                .map(|index| FakeNode::Entry(state.clone(), index))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn text(&self) -> Result<String> {
        match self {
            FakeNode::Text(value) => Ok(value.clone()),
            FakeNode::Toggle(state) => Ok(state.toggle_label().to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn label_context(&self, label: &str) -> Result<Option<String>> {
        match self {
            FakeNode::Root(state) if state.on_results() => Ok(state
                .script
                .label_texts
                .iter()
                .find(|text| text.contains(label))
                .cloned()),
            _ => Ok(None),
        }
    }

    async fn fill(&self, value: &str) -> Result<()> {
        if let FakeNode::Control(state, selector) = self {
            state
                .stats
                .typed
                .lock()
                .unwrap()
                .push((selector.clone(), value.to_string()));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if let FakeNode::Control(state, selector) = self {
            state.stats.cleared.lock().unwrap().push(selector.clone());
        }
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        match self {
            FakeNode::Toggle(state) => {
                state.clicks.fetch_add(1, Ordering::SeqCst);
                state.stats.toggle_clicks.fetch_add(1, Ordering::SeqCst);
            }
            FakeNode::Control(state, selector) if *selector == state.selectors.submit => {
                state.submitted_at.lock().unwrap().get_or_insert_with(Instant::now);
            }
            _ => {}
        }
        Ok(())
    }

    async fn activate(&self, _settle: Duration) -> Result<bool> {
        self.click().await?;
        Ok(matches!(self, FakeNode::Toggle(_)))
    }
}

/// Query source that either yields fixed queries or fails to read.
pub struct FakeSource {
    queries: Option<Vec<SearchQuery>>,
}

impl FakeSource {
    pub fn new(queries: Vec<SearchQuery>) -> Self {
        Self {
            queries: Some(queries),
        }
    }

    pub fn unreadable() -> Self {
        Self { queries: None }
    }
}

impl QuerySource for FakeSource {
    fn describe(&self) -> String {
        "fake source".to_string()
    }

    async fn read_queries(&self) -> Result<Vec<SearchQuery>> {
        self.queries.clone().ok_or_else(|| ScrapeError::SourceError {
            path: "queries.csv".to_string(),
            message: "permission denied".to_string(),
        })
    }
}

/// In-memory sinks shared with the test after the runner takes ownership.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    existing: Arc<HashSet<String>>,
    rows: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
}

impl MemoryWriter {
    pub fn with_existing(paths: &[&str]) -> Self {
        Self {
            existing: Arc::new(paths.iter().map(|p| p.to_string()).collect()),
            rows: Arc::default(),
        }
    }

    pub fn rows(&self, path: &str) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().get(path).cloned().unwrap_or_default()
    }
}

impl TabularWriter for MemoryWriter {
    fn exists(&self, path: &str) -> bool {
        self.existing.contains(path) || self.rows.lock().unwrap().contains_key(path)
    }

    async fn append_row(&self, path: &str, row: &[String]) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(row.to_vec());
        Ok(())
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
