//! In-memory DOM used by the unit tests in `core`.

use crate::domain::ports::DomNode;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct FakeNode {
    text: String,
    children: Vec<(String, FakeNode)>,
    label_texts: Vec<String>,
    toggle: Option<Arc<FakeToggle>>,
}

/// Toggle whose label advances through `labels` on every click; the last label sticks.
pub struct FakeToggle {
    labels: Vec<String>,
    clicks: AtomicUsize,
    stalled: bool,
}

impl FakeToggle {
    pub fn new(labels: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            clicks: AtomicUsize::new(0),
            stalled: false,
        })
    }

    /// Clicks register but `activate` never resolves.
    pub fn stalled(labels: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            clicks: AtomicUsize::new(0),
            stalled: true,
        })
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    fn label(&self) -> String {
        let index = self.clicks().min(self.labels.len().saturating_sub(1));
        self.labels.get(index).cloned().unwrap_or_default()
    }
}

impl FakeNode {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn toggle(toggle: Arc<FakeToggle>) -> Self {
        Self {
            toggle: Some(toggle),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, selector: &str, child: FakeNode) -> Self {
        self.children.push((selector.to_string(), child));
        self
    }

    pub fn with_label_text(mut self, text: &str) -> Self {
        self.label_texts.push(text.to_string());
        self
    }
}

#[async_trait]
impl DomNode for FakeNode {
    async fn query(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self
            .children
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, node)| node.clone()))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>> {
        Ok(self
            .children
            .iter()
            .filter(|(s, _)| s == selector)
            .map(|(_, node)| node.clone())
            .collect())
    }

    async fn text(&self) -> Result<String> {
        match &self.toggle {
            Some(toggle) => Ok(toggle.label()),
            None => Ok(self.text.clone()),
        }
    }

    async fn label_context(&self, label: &str) -> Result<Option<String>> {
        Ok(self.label_texts.iter().find(|t| t.contains(label)).cloned())
    }

    async fn fill(&self, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        if let Some(toggle) = &self.toggle {
            toggle.clicks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn activate(&self, _settle: Duration) -> Result<bool> {
        self.click().await?;
        if self.toggle.as_ref().is_some_and(|t| t.stalled) {
            std::future::pending::<()>().await;
        }
        Ok(true)
    }
}
