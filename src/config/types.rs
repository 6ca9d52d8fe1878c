use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// `{po}` は PO ファイル名に置換される
pub const PO_FILE_PLACEHOLDER: &str = "{po}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "compiler.command[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderSettings {
    /// Project path on the translation service, e.g. `sensei/sensei-wc-paid-courses`.
    pub project: String,

    /// Overrides the catalog endpoint derived from `project`.
    pub catalog_url: Option<String>,

    /// Overrides the export base URL derived from `project`.
    pub base_file_url: Option<String>,

    /// Prefix of the downloaded PO/MO filenames.
    pub file_prefix: String,

    pub minimum_percentage_complete: u32,

    pub packages_dir: String,
    pub tmp_dir: String,

    pub compiler: CompilerConfig,
    pub concurrency: ConcurrencyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// argv template, run with the locale workspace as working directory.
    pub command: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: ["wp", "i18n", "make-json", PO_FILE_PLACEHOLDER, "--no-purge"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConcurrencyConfig {
    /// Upper bound of locale builds in flight.
    /// Default: 4 per CPU core (minimum 1).
    pub max_parallel_builds: Option<usize>,
}

impl ConcurrencyConfig {
    /// 実際に使用する並列数を返す
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.max_parallel_builds.unwrap_or_else(|| num_cpus::get().saturating_mul(4)).max(1)
    }
}

impl BuilderSettings {
    /// カタログ API の URL
    #[must_use]
    pub fn catalog_url(&self) -> String {
        self.catalog_url.clone().unwrap_or_else(|| {
            format!("https://translate.wordpress.com/api/projects/{}/", self.project)
        })
    }

    /// エクスポートファイルのベース URL
    #[must_use]
    pub fn base_file_url(&self) -> String {
        self.base_file_url.clone().unwrap_or_else(|| {
            format!(
                "https://translate.wordpress.com/projects/{}",
                self.project.replace('/', "%2F")
            )
        })
    }

    /// # Errors
    /// - Required field is empty
    /// - Threshold out of range
    /// - Compiler template without PO placeholder
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.project.is_empty() && (self.catalog_url.is_none() || self.base_file_url.is_none())
        {
            errors.push(ValidationError::new(
                "project",
                "The project cannot be empty unless both 'catalogUrl' and 'baseFileUrl' are set",
            ));
        }

        if self.file_prefix.is_empty() {
            errors.push(ValidationError::new(
                "filePrefix",
                "The prefix cannot be empty. Example: \"my-plugin\"",
            ));
        }

        if self.minimum_percentage_complete > 100 {
            errors.push(ValidationError::new(
                "minimumPercentageComplete",
                format!(
                    "Must be between 0 and 100, got {}",
                    self.minimum_percentage_complete
                ),
            ));
        }

        if self.packages_dir.is_empty() {
            errors.push(ValidationError::new("packagesDir", "The directory cannot be empty"));
        }

        if self.tmp_dir.is_empty() {
            errors.push(ValidationError::new("tmpDir", "The directory cannot be empty"));
        }

        match self.compiler.command.first() {
            None => errors.push(ValidationError::new(
                "compiler.command",
                "At least the program is required. Example: [\"wp\", \"i18n\", \"make-json\", \"{po}\", \"--no-purge\"]",
            )),
            Some(program) if program.is_empty() => {
                errors.push(ValidationError::new("compiler.command[0]", "The program cannot be empty"));
            }
            Some(_) => {}
        }

        if !self.compiler.command.is_empty()
            && !self.compiler.command.iter().any(|arg| arg.contains(PO_FILE_PLACEHOLDER))
        {
            errors.push(ValidationError::new(
                "compiler.command",
                format!("The command must pass the PO filename using '{PO_FILE_PLACEHOLDER}'"),
            ));
        }

        if self.concurrency.max_parallel_builds == Some(0) {
            errors.push(ValidationError::new(
                "concurrency.maxParallelBuilds",
                "Must be at least 1. Remove the field to use the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            project: "sensei/sensei-wc-paid-courses".to_string(),
            catalog_url: None,
            base_file_url: None,
            file_prefix: "sensei-wc-paid-courses".to_string(),
            minimum_percentage_complete: 70,
            packages_dir: "packages".to_string(),
            tmp_dir: "tmp".to_string(),
            compiler: CompilerConfig::default(),
            concurrency: ConcurrencyConfig::default(),
        }
    }
}
