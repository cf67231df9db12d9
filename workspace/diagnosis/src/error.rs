use thiserror::Error;

/// Failures talking to the Plant.id identification API.
///
/// Callers degrade every variant to the canned fallback result; the
/// distinction only matters for logging.
#[derive(Error, Debug)]
pub enum PlantIdError {
    #[error("Plant.id API key is not configured")]
    NotConfigured,

    #[error("Plant.id rejected the API key")]
    InvalidApiKey,

    #[error("Plant.id rate limit exceeded")]
    RateLimited,

    #[error("Plant.id returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid Plant.id response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plant.id returned no suggestions")]
    NoSuggestions,
}

/// Failures delivering an email.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Reasons an uploaded image is refused before analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No image provided")]
    MissingImage,

    #[error("No image selected")]
    EmptyFileName,

    #[error("Invalid file type. Please upload PNG, JPG, or WebP images.")]
    UnsupportedType,

    #[error("Image size too large. Maximum size is {}MB.", .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },
}

impl UploadError {
    /// Stable machine readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::MissingImage => "NO_IMAGE",
            UploadError::EmptyFileName => "NO_IMAGE_SELECTED",
            UploadError::UnsupportedType => "INVALID_FILE_TYPE",
            UploadError::TooLarge { .. } => "IMAGE_TOO_LARGE",
        }
    }
}

/// Errors from the storage side of the pipeline.
#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to store image: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
