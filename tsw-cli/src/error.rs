//! Error handling for the TSW CLI

use std::path::PathBuf;
use thiserror::Error;
use tsw_core::TswError;

/// Main error type for TSW CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Alignment error for record '{record}' and template '{template}': {source}")]
    Alignment {
        record: String,
        template: String,
        #[source]
        source: TswError,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn parse<F: Into<String>, S: Into<String>>(file: F, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn alignment<S: Into<String>>(record: S, template: S, source: TswError) -> Self {
        Self::Alignment {
            record: record.into(),
            template: template.into(),
            source,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } | CliError::Parse { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Records and templates are one '<id><TAB><time>.<label>;...' row per line\n\
                 • Check the delimiters under [io] in tsw.toml\n\
                 • Lines starting with '#' are skipped",
            );
        }

        CliError::Alignment { source, .. } => match source {
            TswError::MissingSimilarityEntry { label } => {
                message.push_str(&format!(
                    "\n\nSuggestions:\n\
                     • Add '{}' to the similarity matrix\n\
                     • Omit --similarity to score with a uniform 1.0 / -1.1 table",
                    label
                ));
            }
            TswError::InvalidParameter(_) => {
                message.push_str(
                    "\n\nSuggestions:\n\
                     • Methods are PropDiff, AbsDiff and Uniform\n\
                     • --mem must be -1 (unbounded) or a non-negative count",
                );
            }
            _ => {}
        },

        CliError::Config { .. } | CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your tsw.toml configuration file\n\
                 • Use 'tsw config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
