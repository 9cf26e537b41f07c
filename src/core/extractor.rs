use crate::domain::model::NOT_FOUND;
use crate::domain::ports::DomNode;
use crate::utils::error::{Result, ScrapeError};

/// Single-attempt structural lookup.
pub struct Extractor;

impl Extractor {
    /// 取得 container 內第一個符合 selector 的元素文字；找不到回傳 None，由呼叫端決定是否致命
    pub async fn get<N: DomNode>(container: &N, selector: &str) -> Result<Option<String>> {
        match container.query(selector).await? {
            Some(node) => Ok(Some(node.text().await?.trim().to_string())),
            None => {
                tracing::debug!("No element matched '{}'", selector);
                Ok(None)
            }
        }
    }

    pub async fn require<N: DomNode>(container: &N, selector: &str, field: &str) -> Result<String> {
        Self::get(container, selector)
            .await?
            .ok_or_else(|| ScrapeError::extraction(field))
    }
}

/// Label-based recovery for fields without a stable selector.
///
/// Finds the text node containing the label, takes its enclosing element's text and
/// keeps the last whitespace-separated token, assuming the shape `"<Label> <value>"`.
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub async fn get_by_label<N: DomNode>(container: &N, label: &str) -> Result<String> {
        let context = container.label_context(label).await?;
        context
            .as_deref()
            .and_then(|text| trailing_value(text, label))
            .map(str::to_string)
            .ok_or_else(|| ScrapeError::LabelNotFoundError {
                label: label.to_string(),
            })
    }

    /// Like `get_by_label`, but a missing label becomes the sentinel plus a warning.
    pub async fn get_or_sentinel<N: DomNode>(container: &N, label: &str) -> Result<String> {
        match Self::get_by_label(container, label).await {
            Ok(value) => Ok(value),
            Err(ScrapeError::LabelNotFoundError { label }) => {
                tracing::warn!("⚠️ Label '{}' not found, recording '{}'", label, NOT_FOUND);
                Ok(NOT_FOUND.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

/// Last token of `text`, unless the text holds nothing beyond the label itself.
pub fn trailing_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let token = text.split_whitespace().last()?;
    if token == label {
        return None;
    }
    Some(token)
}
