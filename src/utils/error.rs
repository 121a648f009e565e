use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Source file not found: {path}")]
    SourceNotFound { path: String },

    #[error("Failed to read source '{path}': {message}")]
    SourceReadError { path: String, message: String },

    #[error("Placeholder '{field}' has no matching column in the record")]
    MissingField { field: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Connection refused by {destination}")]
    ConnectionRefused { destination: String },

    #[error("Transport error on {destination}: {message}")]
    TransportError { destination: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Record,
    Transport,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LabelError {
    pub fn source_read(path: impl Into<String>, message: impl ToString) -> Self {
        Self::SourceReadError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. } | Self::SourceReadError { .. } => ErrorCategory::Source,
            Self::MissingField { .. } => ErrorCategory::Record,
            Self::ConnectionRefused { .. } | Self::TransportError { .. } => {
                ErrorCategory::Transport
            }
            Self::Template { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Record => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Source => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 只有來源載入與配置錯誤會中止整個批次；單筆記錄的錯誤只記錄後繼續
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Record | ErrorCategory::Transport
        )
    }

    /// 根據錯誤嚴重程度決定退出碼；單筆錯誤不影響退出碼
    pub fn exit_code(&self) -> i32 {
        if !self.is_fatal() {
            return 0;
        }
        match self.severity() {
            ErrorSeverity::Critical => 3,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceNotFound { path } => {
                format!("The spreadsheet was not found at: {}", path)
            }
            Self::SourceReadError { path, .. } => {
                format!("The spreadsheet '{}' could not be read", path)
            }
            Self::MissingField { field } => format!(
                "Placeholder '{}' was not found in the row data. Check the column names against the template",
                field
            ),
            Self::ConnectionRefused { destination } => format!(
                "Connection refused by {}. Make sure the printer is on and its raw port is enabled",
                destination
            ),
            Self::TransportError { destination, .. } => {
                format!("Sending to {} failed", destination)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Review the TOML configuration file and CLI overrides",
            ErrorCategory::Source => "Check the input path and that the file is a valid spreadsheet",
            ErrorCategory::Record => "Add the missing column to the spreadsheet or remove the placeholder",
            ErrorCategory::Transport => "Check the printer address, port and network reachability",
            ErrorCategory::System => "Check file permissions and available system resources",
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;
