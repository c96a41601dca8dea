//! Tool identifiers and the artifacts a pipeline hands back to its caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// MIME type of CSV artifacts.
pub const MIME_CSV: &str = "text/csv";
/// MIME type of JSON artifacts.
pub const MIME_JSON: &str = "application/json";

/// The file-processing tools built on the pipeline core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    ExcelFixIt,
    LeadScrubber,
    SheetsAutomation,
    InvoiceExtractor,
    QrGenerator,
}

impl ToolId {
    pub const ALL: [ToolId; 5] = [
        Self::ExcelFixIt,
        Self::LeadScrubber,
        Self::SheetsAutomation,
        Self::InvoiceExtractor,
        Self::QrGenerator,
    ];

    /// Stable identifier used in config files and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExcelFixIt => "excel-fix-it",
            Self::LeadScrubber => "lead-scrubber",
            Self::SheetsAutomation => "sheets-automation",
            Self::InvoiceExtractor => "invoice-extractor",
            Self::QrGenerator => "qr-generator",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ExcelFixIt => "Excel Fix It",
            Self::LeadScrubber => "Lead Scrubber",
            Self::SheetsAutomation => "Sheets Automation",
            Self::InvoiceExtractor => "Invoice Extractor",
            Self::QrGenerator => "QR Generator",
        }
    }

    /// Whether the tool processes a batch of documents instead of one table.
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::InvoiceExtractor)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named output buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn csv(name: impl Into<String>, contents: String) -> Self {
        Self {
            name: name.into(),
            mime_type: MIME_CSV,
            bytes: contents.into_bytes(),
        }
    }

    pub fn json(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: MIME_JSON,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A scalar summary counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Count(u64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<u64> for SummaryValue {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<usize> for SummaryValue {
    fn from(value: usize) -> Self {
        Self::Count(value as u64)
    }
}

impl From<bool> for SummaryValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for SummaryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Per-run summary counters keyed by name; ordered for stable output.
pub type Summary = BTreeMap<String, SummaryValue>;
