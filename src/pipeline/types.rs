//! Pipeline type definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::package::{
    FilesystemError,
    ManifestError,
    PackageManifest,
};

/// States of one build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingCatalog,
    Filtering,
    Building,
    AggregatingManifest,
    CleaningUp,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingCatalog => "fetching-catalog",
            Self::Filtering => "filtering",
            Self::Building => "building",
            Self::AggregatingManifest => "aggregating-manifest",
            Self::CleaningUp => "cleaning-up",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Errors that stop the whole run. Locale failures never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Must be called with version number. Example: `langpack-builder build 1.0.0`")]
    Usage,
    #[error("Unable to fetch languages: {0}")]
    FetchFailed(#[from] CatalogError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub version_dir: PathBuf,
    pub manifest: PackageManifest,
    /// Locales below the threshold.
    pub skipped: Vec<String>,
    /// Failed locales and their error messages. Not part of the manifest.
    pub failed: BTreeMap<String, String>,
}

impl BuildReport {
    /// Locale codes that got a package.
    pub fn built(&self) -> impl Iterator<Item = &str> {
        self.manifest.packages.keys().map(String::as_str)
    }
}
