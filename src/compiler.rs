//! 外部リソースコンパイラの呼び出し
//!
//! PO カタログを実行時に読み込める JSON リソースへ変換する外部ツールを、
//! 差し替え可能なインターフェースの裏に置く。

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::config::{
    CompilerConfig,
    PO_FILE_PLACEHOLDER,
};

#[derive(Error, Debug)]
pub enum CompileError {
    /// The command template has no program
    #[error("Compiler command is empty")]
    EmptyCommand,
    /// Failed to start the process
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The process exited with a non-zero status
    #[error("Compiler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// ワークスペース内の PO ファイルをコンパイルする
#[async_trait]
pub trait ResourceCompiler: Send + Sync {
    /// `workspace` 内の `po_filename` をコンパイルする
    ///
    /// 生成物は `workspace` 内に置かれ、既存の無関係なファイルは削除しないこと。
    async fn compile(&self, workspace: &Path, po_filename: &str) -> Result<(), CompileError>;
}

/// 設定された argv テンプレートで外部コマンドを実行するコンパイラ
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    /// argv テンプレート（`{po}` を PO ファイル名に置換）
    command: Vec<String>,
}

impl CommandCompiler {
    #[must_use]
    pub const fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.command.clone())
    }

    /// テンプレートを展開した argv
    fn render_args(&self, po_filename: &str) -> Vec<String> {
        self.command.iter().map(|arg| arg.replace(PO_FILE_PLACEHOLDER, po_filename)).collect()
    }
}

#[async_trait]
impl ResourceCompiler for CommandCompiler {
    async fn compile(&self, workspace: &Path, po_filename: &str) -> Result<(), CompileError> {
        let args = self.render_args(po_filename);
        let Some((program, rest)) = args.split_first() else {
            return Err(CompileError::EmptyCommand);
        };

        tracing::debug!(workspace = %workspace.display(), ?args, "Running resource compiler");

        let output = Command::new(program)
            .args(rest)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CompileError::Spawn { program: program.clone(), source })?;

        if output.status.success() {
            tracing::debug!(
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "Resource compiler finished"
            );
            Ok(())
        } else {
            Err(CompileError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
