//! Entry point for the language pack generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use langpack_builder::Pipeline;
use langpack_builder::config::{
    ConcurrencyConfig,
    ConfigManager,
};
use langpack_builder::pipeline::PipelineError;
use tracing_subscriber::EnvFilter;

/// Language Pack Generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Args {
    /// Project root holding `.langpack.json` (default: current directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Configuration file to use instead of `<project-root>/.langpack.json`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build all the translation packages for a version.
    Build {
        /// Version number, e.g. `1.0.0`
        version: Option<String>,

        /// Minimum percentage translated for a locale to be packaged
        #[arg(long)]
        threshold: Option<u32>,

        /// Upper bound of locale builds in flight
        #[arg(long)]
        max_parallel: Option<usize>,
    },

    /// Remove the temporary locale workspaces.
    Clean,
}

#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(writer)
        .init();

    let args = Args::parse();

    let project_root = args.project_root.or_else(|| std::env::current_dir().ok());
    let mut config_manager = ConfigManager::new();
    if let Err(error) = config_manager.load_settings(project_root, args.config.as_deref()) {
        tracing::error!("{error}");
        return ExitCode::FAILURE;
    }

    match args.command {
        Commands::Build { version, threshold, max_parallel } => {
            let mut settings = config_manager.get_settings().clone();
            if let Some(threshold) = threshold {
                settings.minimum_percentage_complete = threshold;
            }
            if max_parallel.is_some() {
                settings.concurrency = ConcurrencyConfig { max_parallel_builds: max_parallel };
            }
            if let Err(error) = config_manager.update_settings(settings) {
                tracing::error!("{error}");
                return ExitCode::FAILURE;
            }

            let pipeline = Pipeline::from_config(&config_manager);
            match pipeline.run(version.as_deref()).await {
                Ok(report) => {
                    for (locale, reason) in &report.failed {
                        tracing::warn!(locale = %locale, "Not packaged: {reason}");
                    }
                    tracing::info!(
                        built = report.manifest.packages.len(),
                        skipped = report.skipped.len(),
                        failed = report.failed.len(),
                        output = %report.version_dir.display(),
                        "Build finished"
                    );
                    ExitCode::SUCCESS
                }
                Err(error @ PipelineError::Usage) => {
                    tracing::error!("{error}");
                    ExitCode::from(2)
                }
                Err(error) => {
                    tracing::error!("{error}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Clean => {
            let pipeline = Pipeline::from_config(&config_manager);
            match pipeline.directories().remove_workspaces().await {
                Ok(()) => {
                    let tmp_root = pipeline.directories().tmp_root();
                    tracing::info!(path = %tmp_root.display(), "Cleaned workspaces");
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    tracing::error!("{error}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
