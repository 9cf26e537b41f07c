use crate::domain::ports::DomNode;
use crate::utils::error::{Result, ScrapeError};
use std::time::Duration;

pub const DEFAULT_MAX_CLICKS: usize = 3;

/// Toggle state derived from its label on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    MoreAvailable,
    FullyExpanded,
}

impl ToggleState {
    pub fn from_label(label: &str, terminal_label: &str) -> Self {
        if label.trim() == terminal_label {
            ToggleState::FullyExpanded
        } else {
            ToggleState::MoreAvailable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionStop {
    /// Toggle showed the terminal label.
    Terminal,
    /// No toggle rendered; the list is short enough to show in full.
    NoToggle,
    /// Click budget spent without reaching the terminal label.
    CapReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pub clicks: usize,
    pub stop: ExpansionStop,
}

/// Reveals the rest of a collapsible list behind a stateful expand/collapse toggle.
///
/// The same control collapses the list again, so the label is checked before every
/// click; once it reads the terminal label nothing more is clicked. Calling `expand`
/// on an already expanded list is a no-op.
#[derive(Debug, Clone)]
pub struct ListExpander {
    toggle_selector: String,
    terminal_label: String,
    max_clicks: usize,
    settle: Duration,
}

impl ListExpander {
    pub fn new(toggle_selector: impl Into<String>, terminal_label: impl Into<String>) -> Self {
        Self {
            toggle_selector: toggle_selector.into(),
            terminal_label: terminal_label.into(),
            max_clicks: DEFAULT_MAX_CLICKS,
            settle: Duration::from_millis(1500),
        }
    }

    pub fn with_max_clicks(mut self, max_clicks: usize) -> Self {
        self.max_clicks = max_clicks;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub async fn expand<N: DomNode>(&self, container: &N) -> Result<Expansion> {
        let mut clicks = 0;

        while clicks < self.max_clicks {
            let toggle = match container.query(&self.toggle_selector).await? {
                Some(toggle) => toggle,
                None => {
                    tracing::debug!("No roster toggle present after {} clicks", clicks);
                    return Ok(Expansion {
                        clicks,
                        stop: ExpansionStop::NoToggle,
                    });
                }
            };

            let label = toggle.text().await?;
            if ToggleState::from_label(&label, &self.terminal_label) == ToggleState::FullyExpanded {
                return Ok(Expansion {
                    clicks,
                    stop: ExpansionStop::Terminal,
                });
            }

            // activate 自己會在 settle 內結束，外層的上限只防止瀏覽器端卡住
            let guard = self.settle * 2;
            let mutated = tokio::time::timeout(guard, toggle.activate(self.settle))
                .await
                .map_err(|_| ScrapeError::timeout("roster expansion to settle", guard))??;
            clicks += 1;

            if !mutated {
                tracing::debug!("Roster toggle click {} produced no DOM change", clicks);
            }
        }

        tracing::debug!("Roster expansion stopped at the {} click cap", self.max_clicks);
        Ok(Expansion {
            clicks,
            stop: ExpansionStop::CapReached,
        })
    }
}
