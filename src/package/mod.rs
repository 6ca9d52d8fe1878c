//! ロケールパッケージの生成
/// ZIP archive writer
mod archive;
/// Per-locale build
pub mod builder;
/// Output and workspace directories
pub mod directory;
/// `index.json` manifest
pub mod manifest;
/// PO header parsing
pub mod po_header;
/// Package type definitions
mod types;

pub use builder::LocaleBuilder;
pub use directory::PackageDirectoryManager;
pub use manifest::{
    MANIFEST_FILE_NAME,
    ManifestError,
    PackageEntry,
    PackageManifest,
};
pub use types::{
    ArchiveError,
    FilesystemError,
    LocaleBuildError,
    LocaleBuildResult,
    LocaleMetadata,
};
