use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Position of an extraction on a page.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ExtractionBox {
    pub height: f64,
    pub left: f64,
    pub page: u32,
    pub top: f64,
    pub width: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Extraction {
    #[serde(rename = "box", skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<ExtractionBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<String>,
    pub entity: String,
    pub value: String,
}

/// Specific extractions and candidate lists for a document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Extractions {
    pub candidates: HashMap<String, Vec<Extraction>>,
    pub extractions: HashMap<String, Extraction>,
}

impl Extractions {
    /// Value of the extraction named `key`, or an empty string
    pub fn value_of(&self, key: &str) -> &str {
        self.extractions
            .get(key)
            .map(|e| e.value.as_str())
            .unwrap_or("")
    }
}
