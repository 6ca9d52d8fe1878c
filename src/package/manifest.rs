//! バージョンごとのパッケージ一覧 `index.json`

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::types::{
    FilesystemError,
    LocaleBuildResult,
};

/// マニフェストのファイル名
pub const MANIFEST_FILE_NAME: &str = "index.json";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to format build timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// `{ built, version, packages: { <locale>: { updated } } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// ビルド日時（UTC, RFC 3339）
    pub built: String,
    pub version: String,
    /// 成功したロケールのみ（ロケールコード → エントリ）
    pub packages: BTreeMap<String, PackageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// `PO-Revision-Date`、無ければ JSON 上は `false`
    #[serde(with = "revision_date")]
    pub updated: Option<String>,
}

impl PackageManifest {
    /// ロケールごとの結果からマニフェストを組み立てる
    ///
    /// 失敗したロケールは含めない。
    ///
    /// # Errors
    /// タイムスタンプのフォーマットに失敗した場合
    pub fn aggregate<'a>(
        version: &str,
        results: impl IntoIterator<Item = &'a LocaleBuildResult>,
    ) -> Result<Self, ManifestError> {
        let packages = results
            .into_iter()
            .filter_map(|result| result.as_ref().ok())
            .map(|meta| {
                (
                    meta.canonical_locale_code.clone(),
                    PackageEntry { updated: meta.revision_date.clone() },
                )
            })
            .collect();

        Ok(Self {
            built: OffsetDateTime::now_utc().format(&Rfc3339)?,
            version: version.to_string(),
            packages,
        })
    }

    /// `<version_dir>/index.json` に書き出す（上書き）
    ///
    /// # Errors
    /// シリアライズまたは書き込みに失敗した場合
    pub async fn write(&self, version_dir: &Path) -> Result<PathBuf, ManifestError> {
        let path = version_dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_vec(self)?;
        tokio::fs::write(&path, json).await.map_err(|e| FilesystemError::new(&path, e))?;
        Ok(path)
    }

    /// `index.json` を読み込む
    ///
    /// # Errors
    /// 読み込みまたはパースに失敗した場合
    pub async fn read(version_dir: &Path) -> Result<Self, ManifestError> {
        let path = version_dir.join(MANIFEST_FILE_NAME);
        let content = tokio::fs::read(&path).await.map_err(|e| FilesystemError::new(&path, e))?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// `built` を日時として解釈する
    #[must_use]
    pub fn built_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.built, &Rfc3339).ok()
    }
}

/// `Option<String>` ⇔ `"date" | false`
mod revision_date {
    use serde::de::Error as _;
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    /// JSON 上の表現
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Date(String),
        Flag(bool),
    }

    pub(super) fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(date),
            None => serializer.serialize_bool(false),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Date(date) => Ok(Some(date)),
            Wire::Flag(false) => Ok(None),
            Wire::Flag(true) => Err(D::Error::custom("'updated' must be a date string or false")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::package::types::{
        LocaleBuildError,
        LocaleMetadata,
    };

    fn built(code: &str, date: Option<&str>) -> LocaleBuildResult {
        Ok(LocaleMetadata {
            canonical_locale_code: code.to_string(),
            revision_date: date.map(ToString::to_string),
        })
    }

    #[rstest]
    fn aggregate_omits_failed_locales() {
        let results = [
            built("fr_FR", Some("2024-03-05 10:21:44+0000")),
            Err(LocaleBuildError::Download {
                locale: "de_DE".to_string(),
                reason: "MO export missing".to_string(),
            }),
            built("ja", None),
        ];

        let before = OffsetDateTime::now_utc();
        let manifest = PackageManifest::aggregate("1.2.0", &results).unwrap();
        let after = OffsetDateTime::now_utc();

        assert_that!(manifest.version, eq("1.2.0"));
        let keys: Vec<&str> = manifest.packages.keys().map(String::as_str).collect();
        assert_eq!(keys, ["fr_FR", "ja"]);
        let built_at = manifest.built_at().unwrap();
        assert!(before <= built_at && built_at <= after);
    }

    #[rstest]
    fn serializes_missing_revision_as_false() {
        let results = [built("fr_FR", Some("2024")), built("ja", None)];
        let manifest = PackageManifest::aggregate("1.0.0", &results).unwrap();

        let json: serde_json::Value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(json["packages"]["fr_FR"]["updated"], serde_json::json!("2024"));
        assert_eq!(json["packages"]["ja"]["updated"], serde_json::json!(false));
        assert!(json["built"].is_string());
        assert_eq!(json["version"], serde_json::json!("1.0.0"));
    }

    #[rstest]
    fn rejects_updated_true() {
        let json = r#"{"built":"2024-01-01T00:00:00Z","version":"1","packages":{"fr_FR":{"updated":true}}}"#;

        assert!(serde_json::from_str::<PackageManifest>(json).is_err());
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = PackageManifest::aggregate("2.0.0", &[built("fr_FR", None)]).unwrap();

        let path = manifest.write(temp_dir.path()).await.unwrap();
        let loaded = PackageManifest::read(temp_dir.path()).await.unwrap();

        assert_eq!(path, temp_dir.path().join(MANIFEST_FILE_NAME));
        assert_eq!(loaded, manifest);
    }
}
