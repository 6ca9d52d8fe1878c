//! ビルド全体の制御
//!
//! `Idle → FetchingCatalog → Filtering → Building → AggregatingManifest → CleaningUp → Done`
//!
//! ロケールごとのビルドはタスクとして並行実行し、結果はチャネル経由で
//! 単一の収集側へ送る。収集側は全タスクの送信側が閉じるまで待ってからマニフェストを書く。

use std::collections::{
    BTreeMap,
    HashSet,
};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{
    OwnedSemaphorePermit,
    Semaphore,
    mpsc,
};

use super::types::{
    BuildReport,
    PipelineError,
    PipelineState,
};
use crate::catalog::{
    GlotPressClient,
    TranslationService,
    TranslationSet,
    filter_by_completion,
};
use crate::compiler::{
    CommandCompiler,
    ResourceCompiler,
};
use crate::config::ConfigManager;
use crate::package::{
    LocaleBuildError,
    LocaleBuildResult,
    LocaleBuilder,
    PackageDirectoryManager,
    PackageManifest,
};

/// 言語パックのビルドパイプライン
#[derive(Clone)]
pub struct Pipeline {
    /// ロケール単位のビルダー
    builder: LocaleBuilder,
    /// カタログ取得元
    service: Arc<dyn TranslationService>,
    /// 出力・作業ディレクトリ
    directories: Arc<PackageDirectoryManager>,
    /// 最低翻訳率（%）
    threshold: u32,
    /// 同時に実行するロケールビルドの上限
    max_parallel_builds: usize,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("builder", &self.builder)
            .field("service", &"<dyn TranslationService>")
            .field("directories", &self.directories)
            .field("threshold", &self.threshold)
            .field("max_parallel_builds", &self.max_parallel_builds)
            .finish()
    }
}

impl Pipeline {
    /// 依存を直接指定して作成
    #[must_use]
    pub fn new(
        service: Arc<dyn TranslationService>,
        compiler: Arc<dyn ResourceCompiler>,
        directories: PackageDirectoryManager,
        file_prefix: &str,
        threshold: u32,
        max_parallel_builds: usize,
    ) -> Self {
        let directories = Arc::new(directories);
        let builder = LocaleBuilder::new(
            Arc::clone(&service),
            compiler,
            Arc::clone(&directories),
            file_prefix,
        );
        Self {
            builder,
            service,
            directories,
            threshold,
            max_parallel_builds: max_parallel_builds.max(1),
        }
    }

    /// 設定から GlotPress クライアントと外部コンパイラを使って作成
    #[must_use]
    pub fn from_config(config_manager: &ConfigManager) -> Self {
        let settings = config_manager.get_settings();
        Self::new(
            Arc::new(GlotPressClient::from_settings(settings)),
            Arc::new(CommandCompiler::from_config(&settings.compiler)),
            PackageDirectoryManager::new(
                config_manager.resolve_path(&settings.packages_dir),
                config_manager.resolve_path(&settings.tmp_dir),
            ),
            &settings.file_prefix,
            settings.minimum_percentage_complete,
            settings.concurrency.effective_limit(),
        )
    }

    #[must_use]
    pub fn directories(&self) -> &PackageDirectoryManager {
        &self.directories
    }

    /// 指定バージョンの言語パックをビルドする
    ///
    /// # Errors
    /// - `PipelineError::Usage`: バージョン未指定（副作用なし）
    /// - `PipelineError::FetchFailed`: カタログ取得失敗（ロケールのビルドは行わない）
    /// - `PipelineError::Filesystem` / `Manifest`: ディレクトリ操作や書き込みの失敗
    pub async fn run(&self, version: Option<&str>) -> Result<BuildReport, PipelineError> {
        let mut state = PipelineState::Idle;
        let version = version.filter(|v| !v.is_empty()).ok_or(PipelineError::Usage)?;
        let version_dir = self.directories.ensure_version_dir(version).await?;

        transition(&mut state, PipelineState::FetchingCatalog);
        tracing::info!("Fetching languages...");
        let catalog = self.service.fetch_catalog().await.map_err(|error| {
            tracing::error!(%error, "Fetching languages failed");
            PipelineError::FetchFailed(error)
        })?;
        tracing::info!(count = catalog.len(), "Fetched languages");

        transition(&mut state, PipelineState::Filtering);
        let all_codes: Vec<String> =
            catalog.iter().map(|set| set.canonical_locale_code.clone()).collect();
        let qualifying = dedup_locales(filter_by_completion(catalog, self.threshold));
        let qualifying_codes: HashSet<&str> =
            qualifying.iter().map(|set| set.canonical_locale_code.as_str()).collect();
        let skipped: Vec<String> = all_codes
            .iter()
            .filter(|code| !qualifying_codes.contains(code.as_str()))
            .cloned()
            .collect();

        transition(&mut state, PipelineState::Building);
        let mut results = self.build_all(&version_dir, qualifying).await;
        let fatal_locale = results
            .iter()
            .find(|(_, result)| result.as_ref().is_err_and(LocaleBuildError::is_fatal))
            .map(|(locale, _)| locale.clone());
        if let Some(locale) = fatal_locale
            && let Some(Err(LocaleBuildError::Workspace(error))) = results.remove(&locale)
        {
            tracing::error!(locale = %locale, %error, "Workspace setup failed");
            return Err(error.into());
        }

        let failed: BTreeMap<String, String> = results
            .iter()
            .filter_map(|(locale, result)| {
                let error = result.as_ref().err()?;
                tracing::warn!(locale = %locale, %error, "Locale build failed");
                Some((locale.clone(), error.to_string()))
            })
            .collect();

        transition(&mut state, PipelineState::AggregatingManifest);
        let manifest = PackageManifest::aggregate(version, results.values())?;
        manifest.write(&version_dir).await?;
        tracing::info!(packages = manifest.packages.len(), "Built all packages!");

        transition(&mut state, PipelineState::CleaningUp);
        self.directories.remove_workspaces().await?;

        transition(&mut state, PipelineState::Done);
        Ok(BuildReport { version_dir, manifest, skipped, failed })
    }

    /// 全ロケールを並行ビルドし、全タスクの完了を待って結果を返す
    async fn build_all(
        &self,
        version_dir: &Path,
        sets: Vec<TranslationSet>,
    ) -> BTreeMap<String, LocaleBuildResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_builds));
        let (tx, mut rx) = mpsc::channel::<(String, LocaleBuildResult)>(sets.len().max(1));
        let dispatched: Vec<String> =
            sets.iter().map(|set| set.canonical_locale_code.clone()).collect();

        for set in sets {
            let tx = tx.clone();
            let builder = self.builder.clone();
            let semaphore = Arc::clone(&semaphore);
            let version_dir = version_dir.to_path_buf();
            tokio::spawn(async move {
                let result = match acquire_slot(semaphore, &set.canonical_locale_code).await {
                    Ok(_permit) => {
                        tracing::debug!(locale = %set.canonical_locale_code, "Building locale");
                        builder.build(&version_dir, &set).await
                    }
                    Err(error) => Err(error),
                };
                if tx.send((set.canonical_locale_code, result)).await.is_err() {
                    tracing::error!("Result collector closed before all builds settled");
                }
            });
        }
        drop(tx);

        let mut results = BTreeMap::new();
        while let Some((locale, result)) = rx.recv().await {
            results.insert(locale, result);
        }

        for locale in dispatched.iter().filter(|locale| !results.contains_key(*locale)) {
            tracing::error!(locale = %locale, "Locale build task ended without reporting");
        }
        results
    }
}

/// 同時実行枠を取得する
///
/// セマフォが閉じられていればビルドせずにこのロケールを失敗扱いにする。
async fn acquire_slot(
    semaphore: Arc<Semaphore>,
    locale: &str,
) -> Result<OwnedSemaphorePermit, LocaleBuildError> {
    semaphore.acquire_owned().await.map_err(|error| {
        tracing::error!(locale = %locale, %error, "Unable to acquire build slot");
        LocaleBuildError::Unscheduled { locale: locale.to_string() }
    })
}

/// 状態遷移をログに残す
fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = %state, to = %next, "Pipeline state");
    *state = next;
}

/// 同じロケールコードが複数ある場合は最初のものだけを残す
fn dedup_locales(sets: Vec<TranslationSet>) -> Vec<TranslationSet> {
    let mut seen = HashSet::new();
    sets.into_iter()
        .filter(|set| {
            let first = seen.insert(set.canonical_locale_code.clone());
            if !first {
                tracing::warn!(
                    locale = %set.canonical_locale_code,
                    "Duplicate locale in catalog, ignoring {}",
                    set.name
                );
            }
            first
        })
        .collect()
}
