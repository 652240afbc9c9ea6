use thiserror::Error;

use crate::job::ConfigurationError;
use crate::platform::DeviceError;
use crate::raster::RasterError;

/// Errors raised by print jobs and the printer directory.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The named printer, or the system default when `name` is `None`,
    /// could not be opened.
    #[error("printer {} is unavailable: {source}", .name.as_deref().unwrap_or("<default>"))]
    DeviceUnavailable {
        name: Option<String>,
        #[source]
        source: DeviceError,
    },
    #[error("{0} support is not available")]
    CapabilityUnavailable(&'static str),
    #[error("unknown printer `{0}`")]
    UnknownDevice(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Image(#[from] RasterError),
    #[error("print job is closed")]
    Closed,
}
