//! Multi-page print jobs over a paginated rendering device.
//!
//! Callers pick a printer and page settings, then draw lines, rectangles,
//! text and images in points (1/72", y down). The job opens the device on
//! first use and converts every coordinate to device units.

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod font;
pub mod job;
pub mod platform;
pub mod raster;
pub mod resolver;
pub mod transform;

pub use config::ConfigFileError;
pub use controller::{JobState, PrintJob, DEFAULT_TITLE};
pub use directory::PrinterDirectory;
pub use error::PrintError;
pub use font::{get_font, FontSpec, FontWeight};
pub use job::{
    ConfigurationError, DuplexMode, Orientation, PaperSetting, PaperSize, PrintJobConfiguration,
    Setting,
};
pub use platform::{
    DeviceApi, DeviceCall, DeviceCap, DeviceError, DeviceSettings, MapMode, PrinterDescriptor,
    RecordingDevice,
};
pub use raster::{Raster, RasterDecoder, RasterError};
pub use resolver::ResolvedConfiguration;
pub use transform::{to_device, to_device_units, SCALE};
