use thiserror::Error;

/// Reasons a PerfData region cannot be walked.
///
/// Every variant is fatal to the parse that produced it: once an offset in
/// the region is known to be wrong, nothing after it can be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid PerfData header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Corrupt PerfData record #{index}: {reason}")]
    CorruptRecord { index: usize, reason: String },

    #[error("PerfData record #{index} has an unterminated name")]
    UnterminatedName { index: usize },
}

impl FormatError {
    /// Creates a new header error
    pub fn header<S: Into<String>>(reason: S) -> Self {
        Self::InvalidHeader {
            reason: reason.into(),
        }
    }

    /// Creates a new record error
    pub fn record<S: Into<String>>(index: usize, reason: S) -> Self {
        Self::CorruptRecord {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GcmonError {
    #[error("PerfData format error: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No hsperfdata file found for process {0}")]
    ProcessNotFound(u32),

    #[error("PerfData region is not yet accessible")]
    RegionNotReady,

    #[error("Counter not published by the monitored process: {0}")]
    UnknownCounter(String),
}

/// Result type alias for gcmon operations
pub type Result<T> = std::result::Result<T, GcmonError>;

impl GcmonError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the next sampling tick may succeed.
    ///
    /// A region that is still initialising, or one caught mid-way through a
    /// structural change, reads as not ready or malformed for a tick or two.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RegionNotReady => true,
            Self::Format(FormatError::CorruptRecord { .. } | FormatError::UnterminatedName { .. }) => {
                true
            },
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Format(_) => "format",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::ProcessNotFound(_) | Self::UnknownCounter(_) => "not_found",
            Self::RegionNotReady => "not_ready",
        }
    }
}
