use thiserror::Error;

/// Main error type for the pasfoto library
#[derive(Error, Debug)]
pub enum PasfotoError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Background removal error: {0}")]
    Removal(#[from] RemovalError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Camera capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No video input device available")]
    NoDevice,

    #[error("No alternate camera to switch to")]
    NoAlternateDevice,

    #[error("Camera capture is not supported on this platform: {platform}")]
    Unsupported { platform: String },

    #[error("Camera stream is no longer live")]
    StreamClosed,
}

/// Background removal errors
#[derive(Error, Debug)]
pub enum RemovalError {
    #[error("Segmentation failed: {reason}")]
    SegmentationFailed { reason: String },

    #[error("Failed to decode segmentation output: {reason}")]
    DecodeFailed { reason: String },

    #[error("Failed to load input image: {path}")]
    InputLoadFailed { path: String },
}

/// Composition parameter errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("Unknown aspect preset: {token}")]
    InvalidAspect { token: String },

    #[error("Unknown background color: {token}")]
    InvalidBackground { token: String },
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Rasterization failed: {reason}")]
    RasterizationFailed { reason: String },

    #[error("JPEG encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PasfotoError
pub type Result<T> = std::result::Result<T, PasfotoError>;

impl PasfotoError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable by re-triggering the same action
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            // A new upload/capture starts a fresh removal run
            Self::Removal(_) => true,
            // Permission prompts can be re-answered, devices re-plugged
            Self::Capture(CaptureError::PermissionDenied) => true,
            Self::Capture(CaptureError::NoDevice) => true,
            // Export can simply be re-triggered
            Self::Export(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Capture(CaptureError::PermissionDenied) => {
                "Camera access was denied. Please allow camera access and try again.".to_string()
            }
            Self::Capture(CaptureError::NoAlternateDevice) => {
                "No other camera was found. Re-open the camera to keep using the current one."
                    .to_string()
            }
            Self::Composition(CompositionError::InvalidAspect { token }) => {
                format!("Unknown ratio '{}'. Available ratios: 1:1, 3:4, 2:3", token)
            }
            Self::Composition(CompositionError::InvalidBackground { token }) => {
                format!(
                    "Unknown background '{}'. Available backgrounds: white, blue, red",
                    token
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
