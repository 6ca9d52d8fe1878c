//! Catalog type definitions.

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// One locale's completion record as reported by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationSet {
    pub name: String,
    /// Locale slug used in service URLs (e.g. `fr`).
    #[serde(rename = "locale")]
    pub service_locale_code: String,
    /// Locale code used for filenames and manifest keys (e.g. `fr_FR`).
    #[serde(rename = "wp_locale")]
    pub canonical_locale_code: String,
    pub percent_translated: u32,
}

/// Response body of the project endpoint. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogResponse {
    pub(crate) translation_sets: Option<Vec<TranslationSet>>,
}

/// Export formats offered by the translation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Po,
    Mo,
}

impl ExportFormat {
    /// Query value and file extension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Po => "po",
            Self::Mo => "mo",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Non-success status or transport failure
    #[error("Translation service request failed: {0}")]
    Api(String),
    /// Body is not the expected JSON document
    #[error("Invalid set of translations received: {0}")]
    Schema(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        Self::Api(error.to_string())
    }
}
