use thiserror::Error;

#[derive(Error, Debug)]
pub enum HakoakeError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Feed request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Feed returned HTTP {status} for {endpoint}")]
    FeedStatusError { endpoint: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Transformation failed at stage '{stage}': {details}")]
    TransformationError { stage: String, details: String },

    #[error("{entity} with id={id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("MonthlyPlaylist already exists for {month}")]
    PlaylistExists { month: String },

    #[error("No performers with YouTube songs scheduled for {month} found")]
    NoEligiblePerformers { month: String },

    #[error("No songs with YouTube videos found for eligible performers in {month}")]
    NoSongsSelected { month: String },

    #[error("Playlist rule violated: {message}")]
    PlaylistRuleError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, HakoakeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HakoakeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::FeedStatusError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::TransformationError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Data,
            Self::NotFound { .. }
            | Self::PlaylistExists { .. }
            | Self::NoEligiblePerformers { .. }
            | Self::NoSongsSelected { .. }
            | Self::PlaylistRuleError { .. } => ErrorCategory::Catalog,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 沒有可選的表演者只是這個月沒資料，不算失敗
            Self::NoEligiblePerformers { .. } | Self::NoSongsSelected { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::FeedStatusError { .. } => ErrorSeverity::Medium,
            Self::IoError(_) | Self::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) | Self::FeedStatusError { .. } => {
                "Check that the schedule feed endpoint is reachable and retry later".to_string()
            }
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the catalog directory exists and is writable".to_string()
            }
            Self::SerializationError(_) => {
                "The catalog or feed JSON is malformed; restore the latest collected dump".to_string()
            }
            Self::CsvError(_) => "Retry the export; the CSV writer failed".to_string(),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix '{}' in the configuration file", field)
            }
            Self::TransformationError { stage, .. } => {
                format!("Inspect the input records processed by '{}'", stage)
            }
            Self::NotFound { entity, .. } => {
                format!("List existing {} records and use a valid id", entity)
            }
            Self::PlaylistExists { .. } => {
                "Use a different month, or remove the existing playlist from the catalog".to_string()
            }
            Self::NoEligiblePerformers { .. } | Self::NoSongsSelected { .. } => {
                "Import schedules and songs for the target month first".to_string()
            }
            Self::PlaylistRuleError { .. } => {
                "Choose a performer who plays this month and is not already in the playlist"
                    .to_string()
            }
            Self::ValidationError { .. } => "Correct the input and try again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch the schedule feed: {}", self),
            ErrorCategory::Storage => format!("Could not read or write catalog data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Invalid data: {}", self),
            ErrorCategory::Catalog => self.to_string(),
        }
    }
}
