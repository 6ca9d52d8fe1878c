//! テスト用ユーティリティ
//!
//! 翻訳サービスと外部コンパイラのスタブを提供します。
#![cfg(test)]

use std::collections::{
    HashMap,
    HashSet,
};
use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    Mutex,
};

use async_trait::async_trait;

use crate::catalog::{
    CatalogError,
    ExportFormat,
    TranslationService,
    TranslationSet,
};
use crate::compiler::{
    CompileError,
    ResourceCompiler,
};

/// テスト用の `TranslationSet` を作成する
pub(crate) fn translation_set(canonical: &str, service: &str, percent: u32) -> TranslationSet {
    TranslationSet {
        name: format!("Language {canonical}"),
        service_locale_code: service.to_string(),
        canonical_locale_code: canonical.to_string(),
        percent_translated: percent,
    }
}

/// `PO-Revision-Date` を持つ PO ファイルの内容
pub(crate) fn po_with_revision(revision_date: &str) -> Vec<u8> {
    format!(
        "msgid \"\"\nmsgstr \"\"\n\"PO-Revision-Date: {revision_date}\\n\"\n\"Language: xx\\n\"\n\nmsgid \"Course\"\nmsgstr \"Course\"\n"
    )
    .into_bytes()
}

/// ZIP 内のエントリ名（昇順）
pub(crate) fn zip_entry_names(path: &Path) -> Vec<String> {
    let Ok(file) = File::open(path) else { return Vec::new() };
    let Ok(archive) = zip::ZipArchive::new(file) else { return Vec::new() };
    let mut names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
    names.sort();
    names
}

/// メモリ上のカタログとエクスポートを返す `TranslationService`
#[derive(Debug, Default)]
pub(crate) struct StubService {
    /// `fetch_catalog` の結果（`None` ならスキーマエラー）
    catalog: Option<Vec<TranslationSet>>,
    /// (サービスロケール, 形式) → 内容
    exports: HashMap<(String, ExportFormat), Vec<u8>>,
    /// 失敗させるエクスポート
    failing: HashSet<(String, ExportFormat)>,
}

impl StubService {
    pub(crate) fn new(catalog: Vec<TranslationSet>) -> Self {
        Self { catalog: Some(catalog), ..Self::default() }
    }

    pub(crate) fn with_exports(self, service_locale: &str, revision_date: &str) -> Self {
        self.with_raw_exports(service_locale, &po_with_revision(revision_date))
    }

    pub(crate) fn with_raw_exports(mut self, service_locale: &str, po: &[u8]) -> Self {
        self.exports.insert((service_locale.to_string(), ExportFormat::Po), po.to_vec());
        self.exports
            .insert((service_locale.to_string(), ExportFormat::Mo), vec![0xde, 0x12, 0x04, 0x95]);
        self
    }

    pub(crate) fn failing_export(mut self, service_locale: &str, format: ExportFormat) -> Self {
        self.failing.insert((service_locale.to_string(), format));
        self
    }
}

#[async_trait]
impl TranslationService for StubService {
    async fn fetch_catalog(&self) -> Result<Vec<TranslationSet>, CatalogError> {
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

/// 呼び出し履歴（作業ディレクトリ, PO ファイル名）
pub(crate) type CompilerCalls = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// `<po stem>-compiled.json` を生成するだけのコンパイラ
#[derive(Debug, Default)]
pub(crate) struct StubCompiler {
    /// 失敗させるかどうか
    fail: bool,
    /// 呼び出し履歴
    calls: CompilerCalls,
}

impl StubCompiler {
    pub(crate) fn succeeding() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn calls(&self) -> CompilerCalls {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ResourceCompiler for StubCompiler {
    async fn compile(&self, workspace: &Path, po_filename: &str) -> Result<(), CompileError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((workspace.to_path_buf(), po_filename.to_string()));
        }
        if self.fail {
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
