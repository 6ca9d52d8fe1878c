//! 結合テスト用のスタブとヘルパー

#![allow(dead_code, unreachable_pub, clippy::unwrap_used)]

use std::collections::{
    HashMap,
    HashSet,
};
use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::time::Duration;

use async_trait::async_trait;
use langpack_builder::Pipeline;
use langpack_builder::catalog::{
    CatalogError,
    ExportFormat,
    TranslationService,
    TranslationSet,
};
use langpack_builder::compiler::{
    CompileError,
    ResourceCompiler,
};
use langpack_builder::package::PackageDirectoryManager;
use tempfile::TempDir;

pub const PREFIX: &str = "sensei-wc-paid-courses";

pub fn translation_set(canonical: &str, service: &str, percent: u32) -> TranslationSet {
    TranslationSet {
        name: format!("Language {canonical}"),
        service_locale_code: service.to_string(),
        canonical_locale_code: canonical.to_string(),
        percent_translated: percent,
    }
}

fn po_with_revision(revision_date: &str) -> Vec<u8> {
    format!(
        "msgid \"\"\nmsgstr \"\"\n\"PO-Revision-Date: {revision_date}\\n\"\n\nmsgid \"Course\"\nmsgstr \"Course\"\n"
    )
    .into_bytes()
}

/// カタログとエクスポートをメモリ上に持つ翻訳サービス
#[derive(Debug, Default)]
pub struct StubService {
    catalog: Option<Vec<TranslationSet>>,
    exports: HashMap<(String, ExportFormat), Vec<u8>>,
    failing: HashSet<(String, ExportFormat)>,
    catalog_calls: AtomicUsize,
}

impl StubService {
    /// 全ロケールのエクスポートを持つサービス
    pub fn with_catalog(catalog: Vec<TranslationSet>) -> Self {
        let mut exports = HashMap::new();
        for set in &catalog {
            exports.insert(
                (set.service_locale_code.clone(), ExportFormat::Po),
                po_with_revision("2024-03-05 10:21:44+0000"),
            );
            exports.insert((set.service_locale_code.clone(), ExportFormat::Mo), vec![0xde, 0x12]);
        }
        Self { catalog: Some(catalog), exports, ..Self::default() }
    }

    /// `fetch_catalog` がスキーマエラーを返すサービス
    pub fn broken() -> Self {
        Self::default()
    }

    pub fn failing_export(mut self, service_locale: &str, format: ExportFormat) -> Self {
        self.failing.insert((service_locale.to_string(), format));
        self
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationService for StubService {
    async fn fetch_catalog(&self) -> Result<Vec<TranslationSet>, CatalogError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.catalog
            .clone()
            .ok_or_else(|| CatalogError::Schema("missing 'translation_sets' field".to_string()))
    }

    async fn download_export(
        &self,
        service_locale: &str,
        format: ExportFormat,
    ) -> Result<Vec<u8>, CatalogError> {
        let key = (service_locale.to_string(), format);
        if self.failing.contains(&key) {
            return Err(CatalogError::Api(format!("{service_locale} {format}: 500")));
        }
        self.exports
            .get(&key)
            .cloned()
            .ok_or_else(|| CatalogError::Api(format!("{service_locale} {format}: 404")))
    }
}

/// `<stem>-compiled.json` を書き出すコンパイラ
///
/// 同時実行数の最大値を記録する。
#[derive(Debug, Default)]
pub struct StubCompiler {
    failing_files: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, po_filename: &str) -> Self {
        self.failing_files.insert(po_filename.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceCompiler for StubCompiler {
    async fn compile(&self, workspace: &Path, po_filename: &str) -> Result<(), CompileError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_files.contains(po_filename) {
            return Err(CompileError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "stub failure".to_string(),
            });
        }
        let stem = po_filename.trim_end_matches(".po");
        tokio::fs::write(workspace.join(format!("{stem}-compiled.json")), b"{}")
            .await
            .map_err(|source| CompileError::Spawn { program: "stub".to_string(), source })
    }
}

/// 一時ディレクトリ上のパイプライン
pub struct Harness {
    pub temp_dir: TempDir,
    pub service: Arc<StubService>,
    pub compiler: Arc<StubCompiler>,
    pub pipeline: Pipeline,
}

impl Harness {
    pub fn new(service: StubService, compiler: StubCompiler, threshold: u32) -> Self {
        Self::with_limit(service, compiler, threshold, 8)
    }

    pub fn with_limit(
        service: StubService,
        compiler: StubCompiler,
        threshold: u32,
        max_parallel_builds: usize,
    ) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let service = Arc::new(service);
        let compiler = Arc::new(compiler);
        let pipeline = Pipeline::new(
            Arc::clone(&service) as Arc<dyn TranslationService>,
            Arc::clone(&compiler) as Arc<dyn ResourceCompiler>,
            PackageDirectoryManager::new(
                temp_dir.path().join("packages"),
                temp_dir.path().join("tmp"),
            ),
            PREFIX,
            threshold,
            max_parallel_builds,
        );
        Self { temp_dir, service, compiler, pipeline }
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.temp_dir.path().join("packages").join(version)
    }

    pub fn tmp_root(&self) -> PathBuf {
        self.temp_dir.path().join("tmp")
    }
}

/// ディレクトリ直下のエントリ名（昇順）
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// ZIP 内のエントリ名（昇順）
pub fn zip_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
    names.sort();
    names
}
