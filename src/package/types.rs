//! Package type definitions.

use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use crate::compiler::CompileError;

/// Metadata of a successfully built locale package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMetadata {
    pub canonical_locale_code: String,
    /// `PO-Revision-Date` header, if present.
    pub revision_date: Option<String>,
}

/// Outcome of one locale build.
pub type LocaleBuildResult = Result<LocaleMetadata, LocaleBuildError>;

/// Directory setup or output failure. Aborts the whole run.
#[derive(Error, Debug)]
#[error("Filesystem operation failed on {}: {source}", path.display())]
pub struct FilesystemError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl FilesystemError {
    #[must_use]
    pub fn new(path: &Path, source: std::io::Error) -> Self {
        Self { path: path.to_path_buf(), source }
    }
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error while archiving: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Archive task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum LocaleBuildError {
    /// Workspace could not be reset
    #[error(transparent)]
    Workspace(#[from] FilesystemError),
    /// A PO/MO export is missing after download
    #[error("Unable to download files for {locale}: {reason}")]
    Download { locale: String, reason: String },
    #[error("Unable to compile resources for {locale}: {source}")]
    Compile {
        locale: String,
        #[source]
        source: CompileError,
    },
    #[error("Unable to archive {locale}: {source}")]
    Archive {
        locale: String,
        #[source]
        source: ArchiveError,
    },
    /// 同時実行枠を取得できず、ビルドを開始しなかった
    #[error("Unable to schedule build for {locale}: concurrency limiter closed")]
    Unscheduled { locale: String },
}

impl LocaleBuildError {
    /// このエラーがビルド全体を中断させるかどうか
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Workspace(_))
    }
}
