use std::path::PathBuf;

use clipstudio_core::error::CoreError;
use clipstudio_db::StoreError;
use clipstudio_veo::GenerationError;

use crate::config::ConfigError;

/// Application-level error type for command handlers.
///
/// Wraps the error of every crate the commands call into and adds
/// CLI-specific variants. Rendered once, at the top level, through
/// [`AppError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `clipstudio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The library database could not be opened, read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Submitting, polling or downloading a generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// No API key is stored or configured and none could be prompted for.
    #[error("No API key configured")]
    MissingApiKey,

    /// Reading interactive input failed (e.g. stdin is not a terminal).
    #[error("Failed to read input: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// A file named on the command line could not be read or written.
    #[error("{action} {}: {source}", .path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for command return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action: "Failed to read",
            path: path.into(),
            source,
        }
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action: "Failed to write",
            path: path.into(),
            source,
        }
    }

    /// Short text printed to the user in place of the internal error chain.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => format!("{entity} with id {id} not found"),
                CoreError::Validation(msg) => msg.clone(),
            },
            AppError::Config(err) => format!("Configuration error: {err}"),
            AppError::Store(err) => match err {
                StoreError::Unavailable(_) | StoreError::Migration(_) => {
                    tracing::error!(error = %err, "Library store unavailable");
                    "The video library could not be opened.".to_string()
                }
                StoreError::Write(_) => {
                    tracing::error!(error = %err, "Library write failed");
                    "The video could not be saved to the library.".to_string()
                }
                StoreError::Read(_) => {
                    tracing::error!(error = %err, "Library read failed");
                    "The video library could not be read.".to_string()
                }
            },
            AppError::Generation(err) => err.user_message(),
            AppError::MissingApiKey => {
                "No API key configured. Run `clipstudio key set` or set GEMINI_API_KEY."
                    .to_string()
            }
            AppError::Prompt(err) => format!("Failed to read input: {err}"),
            AppError::File { .. } => self.to_string(),
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Generation(GenerationError::Cancelled) => 130,
            AppError::Core(CoreError::Validation(_)) | AppError::Config(_) => 2,
            _ => 1,
        }
    }
}
