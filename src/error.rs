use std::fmt;

use crate::dom::dom_model::NodeId;

#[derive(Debug)]
pub enum PageError {
    /// Page document could not be read from disk
    Load { path: String, source: std::io::Error },

    /// YAML page document failed to parse
    Yaml { context: String, source: serde_yaml::Error },

    /// JSON page document failed to parse
    Json { context: String, source: serde_json::Error },

    /// Selector uses syntax outside the supported subset
    UnsupportedSelector(String),

    /// Node id does not refer to an element of this page
    UnknownNode(NodeId),

    /// Page URL or form action could not be parsed
    InvalidUrl { url: String, source: url::ParseError },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Load { path, source } => {
                write!(f, "Failed to read page document '{}': {}", path, source)
            }
            PageError::Yaml { context, source } => {
                write!(f, "YAML parse error ({}): {}", context, source)
            }
            PageError::Json { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            PageError::UnsupportedSelector(selector) => {
                write!(f, "Unsupported selector: '{}'", selector)
            }
            PageError::UnknownNode(id) => write!(f, "Unknown node {:?}", id),
            PageError::InvalidUrl { url, source } => {
                write!(f, "Invalid URL '{}': {}", url, source)
            }
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::Load { source, .. } => Some(source),
            PageError::Yaml { source, .. } => Some(source),
            PageError::Json { source, .. } => Some(source),
            PageError::InvalidUrl { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum RelayError {
    Page(PageError),

    /// HTTP client could not be constructed
    HttpClient(reqwest::Error),

    /// Requested submit control index is out of range
    NoSubmitControl { index: usize, available: usize },

    /// Clicked control does not sit inside a form
    NoEnclosingForm,

    /// No field with the given name exists in the form
    FieldNotFound(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Page(e) => write!(f, "{}", e),
            RelayError::HttpClient(e) => write!(f, "Failed to build HTTP client: {}", e),
            RelayError::NoSubmitControl { index, available } => write!(
                f,
                "No submit control at index {} ({} available)",
                index, available
            ),
            RelayError::NoEnclosingForm => write!(f, "Submit control is not inside a form"),
            RelayError::FieldNotFound(name) => write!(f, "No field named '{}' in form", name),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Page(e) => Some(e),
            RelayError::HttpClient(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PageError> for RelayError {
    fn from(e: PageError) -> Self {
        RelayError::Page(e)
    }
}
