//! ロケール単位のパッケージビルド
//!
//! 1. 作業ディレクトリをリセット
//! 2. PO / MO エクスポートを並行ダウンロード
//! 3. 外部コンパイラで JSON リソースを生成
//! 4. 作業ディレクトリの全ファイルを `<version_dir>/<locale>.zip` に格納
//! 5. PO ヘッダーから改訂日時を取得
//!
//! 2〜4 の失敗はこのロケールだけの失敗として扱い、作業ディレクトリは調査用に残す。

use std::path::Path;
use std::sync::Arc;

use super::archive::archive_workspace;
use super::directory::PackageDirectoryManager;
use super::po_header::parse_revision_date;
use super::types::{
    LocaleBuildError,
    LocaleBuildResult,
    LocaleMetadata,
};
use crate::catalog::{
    ExportFormat,
    TranslationService,
    TranslationSet,
};
use crate::compiler::ResourceCompiler;

/// ロケールパッケージのビルダー
///
/// 共有部分は `Arc` なので、ロケールごとのタスクへ安価に複製できる。
#[derive(Clone)]
pub struct LocaleBuilder {
    /// エクスポートの取得元
    service: Arc<dyn TranslationService>,
    /// 外部リソースコンパイラ
    compiler: Arc<dyn ResourceCompiler>,
    /// 作業ディレクトリ管理
    directories: Arc<PackageDirectoryManager>,
    /// ダウンロードファイル名の接頭辞
    file_prefix: String,
}

impl std::fmt::Debug for LocaleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleBuilder")
            .field("service", &"<dyn TranslationService>")
            .field("compiler", &"<dyn ResourceCompiler>")
            .field("directories", &self.directories)
            .field("file_prefix", &self.file_prefix)
            .finish()
    }
}

impl LocaleBuilder {
    #[must_use]
    pub fn new(
        service: Arc<dyn TranslationService>,
        compiler: Arc<dyn ResourceCompiler>,
        directories: Arc<PackageDirectoryManager>,
        file_prefix: impl Into<String>,
    ) -> Self {
        Self { service, compiler, directories, file_prefix: file_prefix.into() }
    }

    /// 作業ディレクトリ内のファイル名（`<prefix>-<locale>.<ext>`）
    #[must_use]
    pub fn export_file_name(&self, canonical_locale_code: &str, format: ExportFormat) -> String {
        format!("{}-{canonical_locale_code}.{format}", self.file_prefix)
    }

    /// 1 ロケール分のパッケージをビルドする
    ///
    /// # Errors
    /// - `LocaleBuildError::Workspace`: 作業ディレクトリを用意できない（ビルド全体が中断される）
    /// - `LocaleBuildError::Download` / `Compile` / `Archive`: このロケールのみ失敗
    pub async fn build(&self, version_dir: &Path, set: &TranslationSet) -> LocaleBuildResult {
        let locale = set.canonical_locale_code.as_str();
        let workspace = self.directories.ensure_locale_workspace(locale).await?;

        let po_name = self.export_file_name(locale, ExportFormat::Po);
        let mo_name = self.export_file_name(locale, ExportFormat::Mo);
        let (po, mo) = futures::future::join(
            self.download(set, ExportFormat::Po, &workspace.join(&po_name)),
            self.download(set, ExportFormat::Mo, &workspace.join(&mo_name)),
        )
        .await;
        let po_bytes = po?;
        mo?;

        for name in [&po_name, &mo_name] {
            if !tokio::fs::try_exists(workspace.join(name)).await.unwrap_or(false) {
                return Err(LocaleBuildError::Download {
                    locale: locale.to_string(),
                    reason: format!("{name} is missing after download"),
                });
            }
        }
        tracing::info!(locale, "Downloaded all files for {}", set.name);

        self.compiler
            .compile(&workspace, &po_name)
            .await
            .map_err(|source| LocaleBuildError::Compile { locale: locale.to_string(), source })?;

        let destination = version_dir.join(format!("{locale}.zip"));
        let archived = archive_workspace(&workspace, &destination)
            .await
            .map_err(|source| LocaleBuildError::Archive { locale: locale.to_string(), source })?;
        tracing::debug!(locale, ?archived, zip = %destination.display(), "Archived workspace");

        let revision_date = parse_revision_date(&String::from_utf8_lossy(&po_bytes));
        tracing::info!(locale, ?revision_date, "Added meta for {locale}");

        Ok(LocaleMetadata { canonical_locale_code: locale.to_string(), revision_date })
    }

    /// エクスポートを取得して `path` に保存し、内容を返す
    async fn download(
        &self,
        set: &TranslationSet,
        format: ExportFormat,
        path: &Path,
    ) -> Result<Vec<u8>, LocaleBuildError> {
        let download_error = |reason: String| LocaleBuildError::Download {
            locale: set.canonical_locale_code.clone(),
            reason,
        };

        let bytes = self
            .service
            .download_export(&set.service_locale_code, format)
            .await
            .map_err(|e| download_error(format!("{format} export: {e}")))?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| download_error(format!("writing {}: {e}", path.display())))?;
        Ok(bytes)
    }
}
