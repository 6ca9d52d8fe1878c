//! 作業ディレクトリの ZIP 化

use std::fs::File;
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use zip::write::SimpleFileOptions;
use zip::{
    CompressionMethod,
    ZipWriter,
};

use super::types::ArchiveError;

/// `workspace` 直下の全ファイルを DEFLATE で `destination` に書き出す
///
/// 既存のアーカイブは上書きする。格納したファイル名（昇順）を返す。
pub(super) async fn archive_workspace(
    workspace: &Path,
    destination: &Path,
) -> Result<Vec<String>, ArchiveError> {
    let workspace = workspace.to_path_buf();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || write_archive(&workspace, &destination))
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?
}

/// ブロッキング版の本体
fn write_archive(workspace: &Path, destination: &Path) -> Result<Vec<String>, ArchiveError> {
    let files = collect_files(workspace)?;
    write_files(&files, destination)?;
    Ok(files.into_iter().map(|(name, _)| name).collect())
}

/// `workspace` 直下の通常ファイル（名前順）
fn collect_files(workspace: &Path) -> Result<Vec<(String, PathBuf)>, ArchiveError> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(workspace)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    files.sort();
    Ok(files)
}

/// `<destination>.partial` に書いてから置き換える
///
/// 失敗時は途中のファイルも既存の `destination` も残さない。
fn write_files(files: &[(String, PathBuf)], destination: &Path) -> Result<(), ArchiveError> {
    let mut partial = destination.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let result = write_zip(files, &partial)
        .and_then(|()| std::fs::rename(&partial, destination).map_err(ArchiveError::from));
    if let Err(error) = result {
        discard(&partial);
        discard(destination);
        return Err(error);
    }
    Ok(())
}

/// ZIP 本体の書き出し
fn write_zip(files: &[(String, PathBuf)], path: &Path) -> Result<(), ArchiveError> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, source_path) in files {
        writer.start_file(name.as_str(), options)?;
        let mut source = File::open(source_path)?;
        io::copy(&mut source, &mut writer)?;
    }
    writer.finish()?.flush()?;
    Ok(())
}

/// 失敗したアーカイブの後始末
fn discard(path: &Path) {
    if let Err(error) = std::fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!(path = %path.display(), %error, "Failed to remove incomplete archive");
    }
}
