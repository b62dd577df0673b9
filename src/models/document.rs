use std::{collections::HashMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::poller::Pollable;

/// Processing state of a document as reported by the API.
///
/// `COMPLETED` and `ERROR` are terminal. Every other value, including ones
/// this client does not know about, means processing is still under way.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Progress {
    #[default]
    Pending,
    Completed,
    Error,
    Other(String),
}

impl Progress {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Progress::Completed | Progress::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Progress::Pending => "PENDING",
            Progress::Completed => "COMPLETED",
            Progress::Error => "ERROR",
            Progress::Other(other) => other,
        }
    }
}

impl From<String> for Progress {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING" => Progress::Pending,
            "COMPLETED" => Progress::Completed,
            "ERROR" => Progress::Error,
            _ => Progress::Other(value),
        }
    }
}

impl From<&str> for Progress {
    fn from(value: &str) -> Self {
        Progress::from(value.to_string())
    }
}

impl From<Progress> for String {
    fn from(value: Progress) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock time spent uploading and processing a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub upload: Duration,
    pub processing: Duration,
}

impl Timing {
    pub fn total(&self) -> Duration {
        self.upload + self.processing
    }
}

/// A single page and its rendered images, keyed by resolution.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub images: HashMap<String, String>,
    pub page_number: u32,
}

/// Links to a document's sub-resources.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Links {
    pub document: String,
    pub extractions: String,
    pub layout: String,
    pub processed: String,
}

/// Snapshot of a document as returned by `GET /documents/{id}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(rename = "_links")]
    pub links: Links,
    pub creation_date: i64,
    pub id: String,
    pub name: String,
    pub origin: String,
    pub page_count: u32,
    pub pages: Vec<Page>,
    pub progress: Progress,
    pub source_classification: String,
    /// User identifier the document was fetched for
    #[serde(skip)]
    pub owner: String,
    #[serde(skip)]
    pub timing: Timing,
}

impl Pollable for Document {
    fn progress(&self) -> &Progress {
        &self.progress
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A page of documents together with the total number available.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSet {
    pub total_count: u64,
    pub documents: Vec<Document>,
}
