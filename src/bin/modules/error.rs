use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the core dftd3 library calculations.
    #[error("Calculation error: {0}")]
    Calculation(#[from] dftd3::D3Error),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors parsing a geometry file.
    #[error("Failed to parse {format} geometry from {source_name}: {details}")]
    GeometryParse {
        format: &'static str,
        source_name: String,
        details: String,
    },

    /// Errors parsing a JSON geometry.
    #[error("Failed to parse JSON geometry from {source_name}: {source}")]
    JsonParse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Errors serializing the JSON report.
    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[from] serde_json::Error),

    /// The input file extension does not name a known geometry format.
    #[error("Cannot infer the input format of '{0}'; use --input-format")]
    UnknownInputFormat(String),

    /// Errors installing the log subscriber.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
