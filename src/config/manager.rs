//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    BuilderSettings,
    ConfigError,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: BuilderSettings,

    /// プロジェクトのルートパス
    project_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: BuilderSettings::default(), project_root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `project_root` - プロジェクトのルートパス
    /// * `explicit_file` - `--config` で指定された設定ファイル（指定時は優先）
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(
        &mut self,
        project_root: Option<PathBuf>,
        explicit_file: Option<&Path>,
    ) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for project: {:?}", project_root);

        let settings = match (explicit_file, &project_root) {
            (Some(file), _) => loader::load_from_file(file)?,
            (None, Some(root)) => {
                loader::load_from_project(root)?.map_or_else(BuilderSettings::default, |ps| {
                    tracing::debug!("Loaded project settings: {:?}", ps);
                    ps
                })
            }
            (None, None) => BuilderSettings::default(),
        };

        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.project_root = project_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 設定を更新する（CLI 引数による上書き用）
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, new_settings: BuilderSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &BuilderSettings {
        &self.current_settings
    }

    /// プロジェクトルートを取得
    #[must_use]
    pub const fn project_root(&self) -> Option<&PathBuf> {
        self.project_root.as_ref()
    }

    /// 相対パスの設定値をプロジェクトルート基準で解決する
    #[must_use]
    pub fn resolve_path(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
