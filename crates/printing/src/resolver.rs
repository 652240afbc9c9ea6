//! Merges a requested configuration onto a device's current defaults.

use tracing::debug;

use crate::error::PrintError;
use crate::job::PrintJobConfiguration;
use crate::platform::{DeviceApi, DeviceError, DeviceSettings};

/// Configuration bound to a concrete printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub printer: String,
    pub settings: DeviceSettings,
}

/// Applies every requested field over `defaults`; unset fields keep the
/// device value.
pub fn merge(request: &PrintJobConfiguration, defaults: DeviceSettings) -> DeviceSettings {
    DeviceSettings {
        paper_size: request
            .paper
            .map(|paper| paper.code())
            .unwrap_or(defaults.paper_size),
        orientation: request
            .orientation
            .map(|orientation| orientation.code())
            .unwrap_or(defaults.orientation),
        duplex: request
            .duplex
            .map(|duplex| duplex.code())
            .unwrap_or(defaults.duplex),
    }
}

/// Resolves the printer name (falling back to the system default) and reads
/// its defaults once, releasing the printer handle before returning.
pub fn resolve<D: DeviceApi>(
    device: &D,
    request: &PrintJobConfiguration,
) -> Result<ResolvedConfiguration, PrintError> {
    let printer = match &request.printer {
        Some(name) => name.clone(),
        None => device
            .default_printer()
            .map_err(|source| PrintError::DeviceUnavailable { name: None, source })?
            .ok_or_else(|| PrintError::DeviceUnavailable {
                name: None,
                source: DeviceError::new("default_printer", "no default printer configured"),
            })?,
    };

    let unavailable = |source: DeviceError| PrintError::DeviceUnavailable {
        name: Some(printer.clone()),
        source,
    };
    let handle = device.open_printer(&printer).map_err(unavailable)?;
    let defaults = device.printer_defaults(&handle);
    device.close_printer(handle)?;
    let defaults = defaults.map_err(unavailable)?;

    let settings = merge(request, defaults);
    debug!(
        printer = %printer,
        paper_size = settings.paper_size,
        orientation = settings.orientation,
        duplex = settings.duplex,
        "resolved device configuration"
    );
    Ok(ResolvedConfiguration { printer, settings })
}
