use thiserror::Error;

/// Result type for accessory operations
pub type Result<T> = std::result::Result<T, AccessoryError>;

/// Errors that can occur while serving a SoundTouch accessory
#[derive(Error, Debug)]
pub enum AccessoryError {
    /// A property operation arrived before a matching speaker was found
    #[error("SoundTouch has not been discovered yet")]
    NotDiscovered,

    /// The accessory configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The device transport reported a failure
    #[error("Device error: {detail}")]
    Device {
        /// Error detail reported by the transport
        detail: String,
    },

    /// The device answered with data that cannot be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The host wrote a value of the wrong shape for a property
    #[error("Invalid value {value} for property {property}")]
    InvalidValue { property: String, value: String },

    /// The property is not part of this accessory
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Discovery event channel fell behind
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Discovery event channel was closed
    #[error("Channel closed")]
    ChannelClosed,
}

impl AccessoryError {
    /// Wrap a transport failure so it can be returned from a [`DeviceHandle`](crate::DeviceHandle)
    pub fn device(detail: impl std::fmt::Display) -> Self {
        Self::Device {
            detail: detail.to_string(),
        }
    }
}
