use thiserror::Error;

#[derive(Error, Debug)]
pub enum FabricError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Unknown satellite: {0}")]
    UnknownSatellite(String),

    #[error("No satellites available")]
    NoSatellitesAvailable,

    #[error("Failed to load capability {name}: {reason}")]
    CapabilityLoad { name: String, reason: String },

    #[error("Capability execution failed: {0}")]
    Capability(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Timed out while {0}")]
    Timeout(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FabricError>;
