//! 翻訳サービスのカタログ取得とロケール選別
/// HTTP client for the translation service
pub mod client;
/// Completion threshold filter
pub mod filter;
/// Catalog type definitions
mod types;

pub use client::{
    GlotPressClient,
    TranslationService,
};
pub use filter::filter_by_completion;
pub use types::{
    CatalogError,
    ExportFormat,
    TranslationSet,
};
