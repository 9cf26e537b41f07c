use crate::domain::model::SearchQuery;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Starts the shared browser resource for one run.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Browser: BrowserContext;

    async fn launch(&self) -> Result<Self::Browser>;
}

/// The shared browser resource. Consumed by `close`, so it can be released only once.
#[async_trait]
pub trait BrowserContext: Send + Sync + Sized {
    type Page: PageScope;

    /// 為單一查詢開啟獨立的分頁
    async fn open_page(&self) -> Result<Self::Page>;

    async fn close(self) -> Result<()>;
}

/// An isolated page/tab owned by exactly one query.
#[async_trait]
pub trait PageScope: Send + Sync + Sized {
    type Node: DomNode;

    async fn goto(&self, url: &str) -> Result<()>;

    /// Resolves once an element matches. Unbounded; callers wrap it in a timeout.
    async fn wait_for(&self, selector: &str) -> Result<Self::Node>;

    /// Resolves once the current document has loaded. A click that starts a navigation
    /// does not make this wait for the next document.
    async fn wait_for_navigation(&self) -> Result<()>;

    async fn url(&self) -> Result<Option<String>>;

    /// Document body, the scope for every extraction on the page.
    async fn root(&self) -> Result<Self::Node>;

    async fn close(self) -> Result<()>;
}

/// Opaque element handle.
#[async_trait]
pub trait DomNode: Send + Sync + Sized {
    async fn query(&self, selector: &str) -> Result<Option<Self>>;

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>>;

    async fn text(&self) -> Result<String>;

    /// Full text of the nearest element enclosing a text node that contains `label`.
    async fn label_context(&self, label: &str) -> Result<Option<String>>;

    async fn fill(&self, value: &str) -> Result<()>;

    /// Selects the whole current value and deletes it.
    async fn clear(&self) -> Result<()>;

    async fn click(&self) -> Result<()>;

    /// Clicks and waits up to `settle` for the document to mutate.
    /// Returns whether a mutation was observed.
    async fn activate(&self, settle: Duration) -> Result<bool>;
}

/// Supplies the ordered query sequence for a run.
pub trait QuerySource: Send + Sync {
    fn describe(&self) -> String;
    fn read_queries(&self) -> impl std::future::Future<Output = Result<Vec<SearchQuery>>> + Send;
}

/// Raw append-only tabular destination.
pub trait TabularWriter: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn append_row(
        &self,
        path: &str,
        row: &[String],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
