//! ビルド設定
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    BuilderSettings,
    CompilerConfig,
    ConcurrencyConfig,
    ConfigError,
    PO_FILE_PLACEHOLDER,
    ValidationError,
};
