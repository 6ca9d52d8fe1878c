//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    BuilderSettings,
    ConfigError,
};

/// プロジェクトルートに置く設定ファイル名
pub(super) const CONFIG_FILE_NAME: &str = ".langpack.json";

/// プロジェクトルートから設定を読み込む
///
/// `.langpack.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
pub(super) fn load_from_project(
    project_root: &Path,
) -> Result<Option<BuilderSettings>, ConfigError> {
    let config_path = project_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

/// 明示的に指定された設定ファイルを読み込む
///
/// ファイルが存在しない場合もエラーとする
pub(super) fn load_from_file(config_path: &Path) -> Result<BuilderSettings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: BuilderSettings = serde_json::from_str(&content)?;

    Ok(settings)
}
