//! Printer enumeration with a lazily built descriptor cache.

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::PrintError;
use crate::platform::{DeviceApi, PrinterDescriptor};

/// Lists installed printers and describes them by name.
///
/// The descriptor cache is filled on first use and never refreshed; printers
/// installed afterwards are not seen until [`PrinterDirectory::reset`].
#[derive(Debug)]
pub struct PrinterDirectory<D: DeviceApi> {
    device: D,
    cache: OnceCell<BTreeMap<String, PrinterDescriptor>>,
}

impl<D: DeviceApi> PrinterDirectory<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            cache: OnceCell::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Printer names: the system default first, then every other known
    /// printer in ascending order.
    pub fn list_printers(&self) -> Result<Vec<String>, PrintError> {
        let default = self.device.default_printer()?;
        let cache = self.descriptors()?;

        let mut names = Vec::with_capacity(cache.len() + 1);
        if let Some(default) = &default {
            names.push(default.clone());
        }
        names.extend(
            cache
                .keys()
                .filter(|name| Some(*name) != default.as_ref())
                .cloned(),
        );
        Ok(names)
    }

    pub fn describe(&self, name: &str) -> Result<PrinterDescriptor, PrintError> {
        self.descriptors()?
            .get(name)
            .cloned()
            .ok_or_else(|| PrintError::UnknownDevice(name.to_string()))
    }

    /// Drops the cached descriptors so the next query enumerates again.
    pub fn reset(&mut self) {
        self.cache = OnceCell::new();
    }

    fn descriptors(&self) -> Result<&BTreeMap<String, PrinterDescriptor>, PrintError> {
        self.cache.get_or_try_init(|| {
            let printers = self.device.enumerate_printers()?;
            debug!(count = printers.len(), "populated printer directory");
            Ok::<_, PrintError>(
                printers
                    .into_iter()
                    .map(|printer| (printer.name.clone(), printer))
                    .collect(),
            )
        })
    }
}
