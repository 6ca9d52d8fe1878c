//! 出力ディレクトリと作業ディレクトリの管理

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::types::FilesystemError;

/// `packages/<version>/` と `tmp/<locale>/` を管理する
#[derive(Debug, Clone)]
pub struct PackageDirectoryManager {
    /// パッケージ出力のルート（`packages`）
    packages_root: PathBuf,
    /// 作業ディレクトリのルート（`tmp`）
    tmp_root: PathBuf,
}

impl PackageDirectoryManager {
    #[must_use]
    pub fn new(packages_root: impl Into<PathBuf>, tmp_root: impl Into<PathBuf>) -> Self {
        Self { packages_root: packages_root.into(), tmp_root: tmp_root.into() }
    }

    /// バージョンの出力ディレクトリ
    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.packages_root.join(version)
    }

    /// ロケールの作業ディレクトリ
    #[must_use]
    pub fn workspace_dir(&self, canonical_locale_code: &str) -> PathBuf {
        self.tmp_root.join(canonical_locale_code)
    }

    #[must_use]
    pub fn tmp_root(&self) -> &Path {
        &self.tmp_root
    }

    /// バージョンの出力ディレクトリを用意する
    ///
    /// 既に存在する場合は直下のファイルを削除して再利用し、無ければ作成する。
    ///
    /// # Errors
    /// ファイルシステム操作に失敗した場合
    pub async fn ensure_version_dir(&self, version: &str) -> Result<PathBuf, FilesystemError> {
        let dir = self.version_dir(version);
        if reset_or_create(&dir).await? {
            tracing::info!("Updating packages for version {version}");
        } else {
            tracing::info!("Creating packages for new version {version}");
        }
        Ok(dir)
    }

    /// ロケールの作業ディレクトリを用意する（`ensure_version_dir` と同じ挙動）
    ///
    /// # Errors
    /// ファイルシステム操作に失敗した場合
    pub async fn ensure_locale_workspace(
        &self,
        canonical_locale_code: &str,
    ) -> Result<PathBuf, FilesystemError> {
        let dir = self.workspace_dir(canonical_locale_code);
        reset_or_create(&dir).await?;
        Ok(dir)
    }

    /// 全ロケールの作業ディレクトリをまとめて削除する
    ///
    /// # Errors
    /// ファイルシステム操作に失敗した場合（ルートが無いのは成功扱い）
    pub async fn remove_workspaces(&self) -> Result<(), FilesystemError> {
        match tokio::fs::remove_dir_all(&self.tmp_root).await {
            Ok(()) => {
                tracing::debug!(path = %self.tmp_root.display(), "Removed workspaces");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FilesystemError::new(&self.tmp_root, e)),
        }
    }
}

/// 既存ディレクトリなら直下のファイルを削除し `true`、新規作成なら `false` を返す
async fn reset_or_create(dir: &Path) -> Result<bool, FilesystemError> {
    let exists = tokio::fs::try_exists(dir).await.map_err(|e| FilesystemError::new(dir, e))?;
    if !exists {
        tokio::fs::create_dir_all(dir).await.map_err(|e| FilesystemError::new(dir, e))?;
        return Ok(false);
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| FilesystemError::new(dir, e))?;
    while let Some(entry) = entries.next_entry().await.map_err(|e| FilesystemError::new(dir, e))? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| FilesystemError::new(&path, e))?;
        if file_type.is_dir() {
            continue;
        }
        tokio::fs::remove_file(&path).await.map_err(|e| FilesystemError::new(&path, e))?;
    }
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn manager(root: &Path) -> PackageDirectoryManager {
        PackageDirectoryManager::new(root.join("packages"), root.join("tmp"))
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn ensure_version_dir_creates_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());

        let dir = manager.ensure_version_dir("1.0.0").await.unwrap();

        assert_eq!(dir, temp_dir.path().join("packages").join("1.0.0"));
        assert!(dir.is_dir());
        assert_that!(file_names(&dir), is_empty());
    }

    #[tokio::test]
    async fn ensure_version_dir_removes_previous_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let dir = manager.version_dir("1.0.0");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("fr_FR.zip"), b"old").unwrap();
        fs::write(dir.join("index.json"), b"{}").unwrap();

        manager.ensure_version_dir("1.0.0").await.unwrap();

        assert_that!(file_names(&dir), elements_are![eq("nested")]);
    }

    #[tokio::test]
    async fn ensure_locale_workspace_resets_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let workspace = manager.ensure_locale_workspace("fr_FR").await.unwrap();
        fs::write(workspace.join("plugin-fr_FR.po"), b"stale").unwrap();

        let again = manager.ensure_locale_workspace("fr_FR").await.unwrap();

        assert_eq!(again, workspace);
        assert_that!(file_names(&workspace), is_empty());
    }

    #[tokio::test]
    async fn remove_workspaces_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        manager.ensure_locale_workspace("fr_FR").await.unwrap();
        manager.ensure_locale_workspace("ja").await.unwrap();

        manager.remove_workspaces().await.unwrap();
        manager.remove_workspaces().await.unwrap();

        assert!(!manager.tmp_root().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ensure_version_dir_propagates_failure() {
        let temp_dir = TempDir::new().unwrap();
        // packages がファイルなのでディレクトリを作れない
        fs::write(temp_dir.path().join("packages"), b"not a dir").unwrap();
        let manager = manager(temp_dir.path());

        let result = manager.ensure_version_dir("1.0.0").await;

        assert!(result.is_err());
    }
}
