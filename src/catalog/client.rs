//! 翻訳サービス（GlotPress）へのアクセス

use async_trait::async_trait;
use reqwest::Client;

use super::types::{
    CatalogError,
    CatalogResponse,
    ExportFormat,
    TranslationSet,
};
use crate::config::BuilderSettings;

/// 翻訳サービスへのアクセス手段
///
/// テストではスタブに差し替える。
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// プロジェクトの翻訳セット一覧を取得する（ネットワーク呼び出しは 1 回）
    async fn fetch_catalog(&self) -> Result<Vec<TranslationSet>, CatalogError>;

    /// ロケールのエクスポートファイルを取得する
    ///
    /// `service_locale` はサービス側のロケールスラッグ（`TranslationSet::service_locale_code`）
    async fn download_export(
        &self,
        service_locale: &str,
        format: ExportFormat,
    ) -> Result<Vec<u8>, CatalogError>;
}

/// reqwest による `TranslationService` 実装
#[derive(Debug, Clone)]
pub struct GlotPressClient {
    /// HTTP クライアント（コネクションプールを共有）
    http: Client,
    /// カタログ API の URL
    catalog_url: String,
    /// エクスポートファイルのベース URL
    base_file_url: String,
}

impl GlotPressClient {
    /// URL を直接指定して作成
    #[must_use]
    pub fn new(catalog_url: impl Into<String>, base_file_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            catalog_url: catalog_url.into(),
            base_file_url: base_file_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 設定から作成
    #[must_use]
    pub fn from_settings(settings: &BuilderSettings) -> Self {
        Self::new(settings.catalog_url(), settings.base_file_url())
    }

    /// エクスポートファイルの URL
    #[must_use]
    pub fn export_url(&self, service_locale: &str, format: ExportFormat) -> String {
        format!(
            "{}/{service_locale}/default/export-translations/?format={format}",
            self.base_file_url
        )
    }

    /// GET してステータスを検査し、本文を返す
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Api(format!("GET {url} returned {status}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TranslationService for GlotPressClient {
    async fn fetch_catalog(&self) -> Result<Vec<TranslationSet>, CatalogError> {
        tracing::debug!(url = %self.catalog_url, "Fetching languages");
        let body = self.get_bytes(&self.catalog_url).await?;
        parse_catalog(&body)
    }

    async fn download_export(
        &self,
        service_locale: &str,
        format: ExportFormat,
    ) -> Result<Vec<u8>, CatalogError> {
        let url = self.export_url(service_locale, format);
        tracing::debug!(%url, "Downloading export");
        self.get_bytes(&url).await
    }
}

/// カタログ API のレスポンス本文を解析する
///
/// # Errors
/// JSON でない場合、または `translation_sets` が無い場合は `CatalogError::Schema`
pub fn parse_catalog(body: &[u8]) -> Result<Vec<TranslationSet>, CatalogError> {
    let response: CatalogResponse =
        serde_json::from_slice(body).map_err(|e| CatalogError::Schema(e.to_string()))?;
    response
        .translation_sets
        .ok_or_else(|| CatalogError::Schema("missing 'translation_sets' field".to_string()))
}
