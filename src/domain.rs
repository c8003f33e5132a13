use std::fmt;
use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;
use tracing_error::SpanTrace;

use crate::comparator::SortKey;
use crate::dom::NodeId;

#[derive(Debug)]
pub enum MSError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    UnknownFileType,
    MissingColumn(String),
    // A node the host page is expected to render could not be found.
    MissingElement { selector: String, span: SpanTrace },
}

impl MSError {
    pub fn missing(selector: impl Into<String>) -> Self {
        MSError::MissingElement {
            selector: selector.into(),
            span: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for MSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MSError::IoError(e) => write!(f, "io error: {e}"),
            MSError::PolarsError(e) => write!(f, "polars error: {e}"),
            MSError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            MSError::UnknownFileType => write!(f, "unknown file type"),
            MSError::MissingColumn(name) => write!(f, "missing column \"{name}\""),
            MSError::MissingElement { selector, span } => {
                write!(f, "missing element \"{selector}\"\n{span}")
            }
        }
    }
}

impl std::error::Error for MSError {}

impl From<Error> for MSError {
    fn from(err: Error) -> Self {
        MSError::IoError(err)
    }
}

impl From<PolarsError> for MSError {
    fn from(err: PolarsError) -> Self {
        MSError::PolarsError(err)
    }
}

/// Names and timings the sorting session relies on. The defaults match the
/// scouts' log markup.
#[derive(Debug, Clone, Setters)]
#[setters(into)]
pub struct SortConfig {
    pub capability: String,
    pub poll_interval: Duration,
    pub panel_id: String,
    pub panel_content_class: String,
    pub options_class: String,
    pub table_id: String,
    pub button_class: String,
    pub style_id: String,
    pub jump_class: String,
    pub jump_attribute: String,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            capability: "mystic admin".to_string(),
            poll_interval: Duration::from_millis(100),
            panel_id: "slPanel".to_string(),
            panel_content_class: "slPanelContent".to_string(),
            options_class: "slOptions".to_string(),
            table_id: "sl-main-table".to_string(),
            button_class: "mysticSortButton".to_string(),
            style_id: "mysticSortButtonStyle".to_string(),
            jump_class: "slJumpToCell".to_string(),
            jump_attribute: "data-cell-id".to_string(),
        }
    }
}

impl SortConfig {
    pub fn body_selector(&self) -> String {
        format!("#{} > table > tbody", self.table_id)
    }

    pub fn header_selector(&self) -> String {
        format!("#{} > table > thead > tr", self.table_id)
    }
}

/// What a click on a bound node means to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Sort(NodeId, SortKey),
    JumpToCell(u64),
}
