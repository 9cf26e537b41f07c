use crate::config::toml_config::BrowserSettings;
use crate::domain::ports::{BrowserContext, BrowserLauncher, DomNode, PageScope};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl From<CdpError> for ScrapeError {
    fn from(e: CdpError) -> Self {
        ScrapeError::browser(e.to_string())
    }
}

pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Browser = ChromiumBrowser;

    async fn launch(&self) -> Result<ChromiumBrowser> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(self.settings.request_timeout_secs));
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(ScrapeError::browser)?;

        tracing::debug!("Launching browser (headless: {})", self.settings.headless);
        let (browser, mut handler) = Browser::launch(config).await?;

        // CDP 事件必須持續消化，否則所有指令都會卡住
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!("chromiumoxide handler event error: {}", e);
                }
            }
        });

        Ok(ChromiumBrowser {
            browser,
            handler_task,
        })
    }
}

pub struct ChromiumBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserContext for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn open_page(&self) -> Result<ChromiumPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromiumPage { page })
    }

    async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}

pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageScope for ChromiumPage {
    type Node = ChromiumNode;

    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> Result<ChromiumNode> {
        loop {
            match self.page.find_elements(selector).await {
                Ok(elements) => {
                    if let Some(element) = elements.into_iter().next() {
                        return Ok(ChromiumNode { element });
                    }
                }
                // the document may still be swapping; keep polling until the caller's timeout
                Err(e) => tracing::debug!("Polling '{}' failed: {}", selector, e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn root(&self) -> Result<ChromiumNode> {
        let element = self.page.find_element("body").await?;
        Ok(ChromiumNode { element })
    }

    async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

pub struct ChromiumNode {
    element: Element,
}

impl ChromiumNode {
    async fn call(&self, function: String, await_promise: bool) -> Result<Option<serde_json::Value>> {
        let returns = self.element.call_js_fn(function, await_promise).await?;
        if let Some(details) = returns.exception_details {
            return Err(ScrapeError::browser(format!("script failed: {}", details.text)));
        }
        Ok(returns.result.value)
    }
}

#[async_trait]
impl DomNode for ChromiumNode {
    async fn query(&self, selector: &str) -> Result<Option<Self>> {
        let elements = self.element.find_elements(selector).await?;
        Ok(elements.into_iter().next().map(|element| ChromiumNode { element }))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>> {
        let elements = self.element.find_elements(selector).await?;
        Ok(elements.into_iter().map(|element| ChromiumNode { element }).collect())
    }

    async fn text(&self) -> Result<String> {
        let value = self
            .call("function() { return this.textContent; }".to_string(), false)
            .await?;
        Ok(value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn label_context(&self, label: &str) -> Result<Option<String>> {
        let value = self.call(label_context_script(label)?, false).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn fill(&self, value: &str) -> Result<()> {
        self.element.focus().await?;
        self.element.type_str(value).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.call("function() { this.focus(); this.select(); }".to_string(), false)
            .await?;
        self.element.press_key("Backspace").await?;
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await?;
        Ok(())
    }

    async fn activate(&self, settle: Duration) -> Result<bool> {
        let value = self.call(activate_script(settle), true).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

/// Walks the text nodes under `this`; for the first one containing the label, climbs to the
/// nearest ancestor holding more text than the label node itself.
fn label_context_script(label: &str) -> Result<String> {
    let label = serde_json::to_string(label)?;
    Ok(format!(
        r#"function() {{
    const label = {label};
    const walker = document.createTreeWalker(this, NodeFilter.SHOW_TEXT);
    while (walker.nextNode()) {{
        const node = walker.currentNode;
        if (!node.textContent.includes(label)) continue;
        const own = node.textContent.trim();
        let element = node.parentElement;
        while (element && element !== this && element.textContent.trim() === own) {{
            element = element.parentElement;
        }}
        if (!element || element === this) element = node.parentElement;
        return element ? element.textContent : node.textContent;
    }}
    return null;
}}"#
    ))
}

/// Clicks `this` and resolves true on the first DOM mutation outside the toggle itself,
/// or false once `settle` elapses.
fn activate_script(settle: Duration) -> String {
    format!(
        r#"function() {{
    const toggle = this;
    return new Promise((resolve) => {{
        const observer = new MutationObserver((records) => {{
            if (records.some((r) => !toggle.contains(r.target))) {{
                observer.disconnect();
                clearTimeout(timer);
                resolve(true);
            }}
        }});
        const timer = setTimeout(() => {{
            observer.disconnect();
            resolve(false);
        }}, {millis});
        observer.observe(document.body, {{ childList: true, subtree: true }});
        toggle.click();
    }});
}}"#,
        millis = settle.as_millis()
    )
}
