use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Placeholder for any value that could not be located on the page.
pub const NOT_AVAILABLE: &str = "N/A";
/// Price text used when the page has no price element.
pub const PRICE_FALLBACK: &str = "0,00";
/// Appended to every price, including the fallback.
pub const CURRENCY_SUFFIX: &str = " €";

pub const NAME_KEY: &str = "Name";
pub const PRICE_KEY: &str = "Preis";

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("invalid metric spec: {0}")]
    InvalidSpec(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScraperError {
    /// Acquisition failures exit with 1, everything the user can fix with 2.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Http(_) | Self::Status { .. } => 1,
            Self::EmptyIdentifier
            | Self::InvalidSpec(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_) => 2,
        }
    }

    pub const fn is_acquisition(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// An ISIN or any other token the quote site understands. Only emptiness is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ScraperError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ScraperError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One metric to look up: `key` is what the caller sees, `label` is the cell text to search for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetricLabel {
    pub key: String,
    pub label: String,
}

impl MetricLabel {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Ordered set of metrics to extract. Order is kept for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<MetricLabel>", into = "Vec<MetricLabel>")]
pub struct MetricSpec {
    labels: Vec<MetricLabel>,
}

impl MetricSpec {
    pub fn new(labels: Vec<MetricLabel>) -> Result<Self, ScraperError> {
        let mut seen = HashSet::new();
        for entry in &labels {
            if entry.key.trim().is_empty() {
                return Err(ScraperError::InvalidSpec("metric key must not be empty".into()));
            }
            if entry.key == NAME_KEY || entry.key == PRICE_KEY {
                return Err(ScraperError::InvalidSpec(format!(
                    "metric key '{}' is reserved",
                    entry.key
                )));
            }
            // An empty label is a substring of every cell.
            if entry.label.is_empty() {
                return Err(ScraperError::InvalidSpec(format!(
                    "label for '{}' must not be empty",
                    entry.key
                )));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(ScraperError::InvalidSpec(format!(
                    "duplicate metric key '{}'",
                    entry.key
                )));
            }
        }
        Ok(Self { labels })
    }

    /// The metric set shown by the value-investing dashboard.
    pub fn value_investor() -> Self {
        Self {
            labels: vec![
                MetricLabel::new("KGV", "KGV (aktuell)"),
                MetricLabel::new("KBV", "KBV"),
                MetricLabel::new("KUV", "KUV"),
                MetricLabel::new("Dividendenrendite", "Dividendenrendite"),
                MetricLabel::new("Eigenkapitalrendite", "Eigenkapitalrendite"),
                MetricLabel::new("Marktkapitalisierung", "Marktkapitalisierung"),
            ],
        }
    }

    pub fn labels(&self) -> &[MetricLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for MetricSpec {
    fn default() -> Self {
        Self::value_investor()
    }
}

impl TryFrom<Vec<MetricLabel>> for MetricSpec {
    type Error = ScraperError;

    fn try_from(labels: Vec<MetricLabel>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<MetricSpec> for Vec<MetricLabel> {
    fn from(spec: MetricSpec) -> Self {
        spec.labels
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricValue {
    pub key: String,
    pub value: String,
}

/// What one extraction produced. `price` already carries the currency suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricResult {
    pub name: String,
    pub price: String,
    pub metrics: Vec<MetricValue>,
}

impl MetricResult {
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            NAME_KEY => Some(&self.name),
            PRICE_KEY => Some(&self.price),
            _ => self
                .metrics
                .iter()
                .find(|m| m.key == key)
                .map(|m| m.value.as_str()),
        }
    }
}

// Flat object: {"Name": .., "Preis": .., "KGV": .., ...}
impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.metrics.len() + 2))?;
        map.serialize_entry(NAME_KEY, &self.name)?;
        map.serialize_entry(PRICE_KEY, &self.price)?;
        for metric in &self.metrics {
            map.serialize_entry(&metric.key, &metric.value)?;
        }
        map.end()
    }
}
