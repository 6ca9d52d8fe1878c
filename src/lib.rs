//! langpack-builder
//!
//! GlotPress の翻訳プロジェクトからバージョンごとのロケール別言語パック（ZIP）と
//! `index.json` マニフェストを生成する

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod package;
pub mod pipeline;
mod test_utils;

// Pipeline を再エクスポート
pub use pipeline::Pipeline;
