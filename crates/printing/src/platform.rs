//! Device and rendering API consumed by print jobs, plus an in-memory
//! implementation that records every call.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::font::FontSpec;
use crate::raster::Raster;

/// Failure reported by a device back end.
/// 裝置後端回報的錯誤。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct DeviceError {
    pub operation: &'static str,
    pub message: String,
}

impl DeviceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Descriptive fields of an installed printer.
/// 已安裝印表機的描述欄位。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDescriptor {
    pub name: String,
    pub flags: u32,
    pub description: String,
    pub comment: String,
}

impl PrinterDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            flags: 0,
            comment: String::new(),
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Device-native page settings (paper, orientation and duplex codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub paper_size: i16,
    pub orientation: i16,
    pub duplex: i16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            paper_size: 1,
            orientation: 1,
            duplex: 1,
        }
    }
}

/// Integer capabilities that can be queried from a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DeviceCap {
    /// Printable width in device pixels.
    HorizontalResolution = 8,
    /// Printable height in device pixels.
    VerticalResolution = 10,
    HorizontalDpi = 88,
    VerticalDpi = 90,
    PhysicalWidth = 110,
    PhysicalHeight = 111,
}

impl DeviceCap {
    pub const fn index(self) -> i32 {
        self as i32
    }
}

/// Coordinate mapping mode of a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// One logical unit is 1/20 of a point; y grows upward.
    Twips,
}

impl MapMode {
    pub const fn code(self) -> i32 {
        match self {
            MapMode::Twips => 6,
        }
    }
}

/// Abstraction over the platform printing and rendering API.
/// 平台列印與繪圖 API 的抽象介面。
///
/// Handles are consumed by the calls that release them, so a back end never
/// sees the same handle released twice.
pub trait DeviceApi {
    type Printer;
    type Context;
    type Pen;
    type Font;

    /// Name of the system default printer, if one is configured.
    fn default_printer(&self) -> Result<Option<String>, DeviceError>;
    fn enumerate_printers(&self) -> Result<Vec<PrinterDescriptor>, DeviceError>;

    fn open_printer(&self, name: &str) -> Result<Self::Printer, DeviceError>;
    fn printer_defaults(&self, printer: &Self::Printer) -> Result<DeviceSettings, DeviceError>;
    fn close_printer(&self, printer: Self::Printer) -> Result<(), DeviceError>;

    fn create_context(
        &self,
        printer: &str,
        settings: &DeviceSettings,
    ) -> Result<Self::Context, DeviceError>;
    fn delete_context(&self, context: Self::Context) -> Result<(), DeviceError>;
    fn set_map_mode(&self, context: &Self::Context, mode: MapMode) -> Result<(), DeviceError>;
    fn device_caps(&self, context: &Self::Context, cap: DeviceCap) -> Result<i32, DeviceError>;

    fn start_doc(&self, context: &Self::Context, title: &str) -> Result<(), DeviceError>;
    fn end_doc(&self, context: &Self::Context) -> Result<(), DeviceError>;
    fn start_page(&self, context: &Self::Context) -> Result<(), DeviceError>;
    fn end_page(&self, context: &Self::Context) -> Result<(), DeviceError>;

    fn create_pen(&self, context: &Self::Context, width: i32) -> Result<Self::Pen, DeviceError>;
    fn select_pen(&self, context: &Self::Context, pen: &Self::Pen) -> Result<(), DeviceError>;
    fn delete_pen(&self, pen: Self::Pen) -> Result<(), DeviceError>;

    fn create_font(&self, context: &Self::Context, spec: &FontSpec)
        -> Result<Self::Font, DeviceError>;
    fn select_font(&self, context: &Self::Context, font: &Self::Font) -> Result<(), DeviceError>;
    fn delete_font(&self, font: Self::Font) -> Result<(), DeviceError>;

    fn move_to(&self, context: &Self::Context, point: [i32; 2]) -> Result<(), DeviceError>;
    fn line_to(&self, context: &Self::Context, point: [i32; 2]) -> Result<(), DeviceError>;
    fn text_out(
        &self,
        context: &Self::Context,
        point: [i32; 2],
        text: &str,
    ) -> Result<(), DeviceError>;
    fn blit(
        &self,
        context: &Self::Context,
        raster: &Raster,
        dest: [i32; 4],
    ) -> Result<(), DeviceError>;
}

/// One call observed by [`RecordingDevice`].
/// 記錄裝置所觀察到的單一呼叫。
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    OpenPrinter(String),
    ClosePrinter(String),
    CreateContext {
        printer: String,
        settings: DeviceSettings,
    },
    DeleteContext(u64),
    SetMapMode(MapMode),
    StartDoc(String),
    EndDoc,
    StartPage,
    EndPage,
    CreatePen {
        id: u64,
        width: i32,
    },
    SelectPen(u64),
    DeletePen(u64),
    CreateFont {
        id: u64,
        spec: FontSpec,
    },
    SelectFont(u64),
    DeleteFont(u64),
    MoveTo([i32; 2]),
    LineTo([i32; 2]),
    TextOut {
        point: [i32; 2],
        text: String,
    },
    Blit {
        width: u32,
        height: u32,
        dest: [i32; 4],
    },
}

/// Handle issued by [`RecordingDevice`].
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedHandle(u64);

impl RecordedHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Printer handle issued by [`RecordingDevice`].
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedPrinter {
    id: u64,
    name: String,
}

impl RecordedPrinter {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct RecordingState {
    printers: Vec<PrinterDescriptor>,
    default_printer: Option<String>,
    defaults: DeviceSettings,
    caps: HashMap<DeviceCap, i32>,
    calls: Vec<DeviceCall>,
    live: BTreeSet<u64>,
    next_id: u64,
    enumerations: usize,
    opens: usize,
    failing: Option<&'static str>,
}

/// In-memory [`DeviceApi`] that logs every call and tracks live handles.
/// 記錄所有呼叫並追蹤存活控制代碼的記憶體內部裝置實作。
///
/// Clones share the same log, so a test can keep one clone while a job owns
/// another.
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    state: Arc<Mutex<RecordingState>>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A device with no printers and a letter-sized 600 dpi page.
    pub fn new() -> Self {
        let caps = HashMap::from([
            (DeviceCap::HorizontalResolution, 4800),
            (DeviceCap::VerticalResolution, 6360),
            (DeviceCap::HorizontalDpi, 600),
            (DeviceCap::VerticalDpi, 600),
            (DeviceCap::PhysicalWidth, 5100),
            (DeviceCap::PhysicalHeight, 6600),
        ]);
        Self {
            state: Arc::new(Mutex::new(RecordingState {
                printers: Vec::new(),
                default_printer: None,
                defaults: DeviceSettings::default(),
                caps,
                calls: Vec::new(),
                live: BTreeSet::new(),
                next_id: 1,
                enumerations: 0,
                opens: 0,
                failing: None,
            })),
        }
    }

    pub fn with_printer(self, descriptor: PrinterDescriptor) -> Self {
        self.state().printers.push(descriptor);
        self
    }

    /// Registers `name` (if needed) and makes it the system default.
    pub fn with_default_printer(self, name: impl Into<String>) -> Self {
        let name = name.into();
        {
            let mut state = self.state();
            if !state.printers.iter().any(|printer| printer.name == name) {
                state.printers.push(PrinterDescriptor::new(name.clone()));
            }
            state.default_printer = Some(name);
        }
        self
    }

    pub fn with_defaults(self, defaults: DeviceSettings) -> Self {
        self.state().defaults = defaults;
        self
    }

    pub fn with_capability(self, cap: DeviceCap, value: i32) -> Self {
        self.state().caps.insert(cap, value);
        self
    }

    /// Makes every call to `operation` fail from now on.
    pub fn fail_on(&self, operation: &'static str) {
        self.state().failing = Some(operation);
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.state().calls)
    }

    /// Number of successful `open_printer` calls.
    pub fn open_count(&self) -> usize {
        self.state().opens
    }

    pub fn enumeration_count(&self) -> usize {
        self.state().enumerations
    }

    /// Ids of printers, contexts, pens and fonts not yet released.
    pub fn live_handles(&self) -> Vec<u64> {
        self.state().live.iter().copied().collect()
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, operation: &'static str, call: DeviceCall) -> Result<(), DeviceError> {
        let mut state = self.state();
        check_failing(&state, operation)?;
        state.calls.push(call);
        Ok(())
    }

    fn allocate(&self, operation: &'static str) -> Result<u64, DeviceError> {
        let mut state = self.state();
        check_failing(&state, operation)?;
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(id);
        Ok(id)
    }

    fn release(
        &self,
        operation: &'static str,
        id: u64,
        call: DeviceCall,
    ) -> Result<(), DeviceError> {
        let mut state = self.state();
        check_failing(&state, operation)?;
        if !state.live.remove(&id) {
            return Err(DeviceError::new(operation, format!("handle {id} is not live")));
        }
        state.calls.push(call);
        Ok(())
    }

    fn require_live(&self, operation: &'static str, id: u64) -> Result<(), DeviceError> {
        if self.state().live.contains(&id) {
            Ok(())
        } else {
            Err(DeviceError::new(operation, format!("handle {id} is not live")))
        }
    }
}

fn check_failing(state: &RecordingState, operation: &'static str) -> Result<(), DeviceError> {
    match state.failing {
        Some(failing) if failing == operation => {
            Err(DeviceError::new(operation, "injected failure"))
        }
        _ => Ok(()),
    }
}

impl DeviceApi for RecordingDevice {
    type Printer = RecordedPrinter;
    type Context = RecordedHandle;
    type Pen = RecordedHandle;
    type Font = RecordedHandle;

    fn default_printer(&self) -> Result<Option<String>, DeviceError> {
        let state = self.state();
        check_failing(&state, "default_printer")?;
        Ok(state.default_printer.clone())
    }

    fn enumerate_printers(&self) -> Result<Vec<PrinterDescriptor>, DeviceError> {
        let mut state = self.state();
        check_failing(&state, "enumerate_printers")?;
        state.enumerations += 1;
        Ok(state.printers.clone())
    }

    fn open_printer(&self, name: &str) -> Result<Self::Printer, DeviceError> {
        let known = self.state().printers.iter().any(|printer| printer.name == name);
        if !known {
            return Err(DeviceError::new(
                "open_printer",
                format!("no printer named `{name}`"),
            ));
        }
        let id = self.allocate("open_printer")?;
        let mut state = self.state();
        state.opens += 1;
        state.calls.push(DeviceCall::OpenPrinter(name.to_string()));
        Ok(RecordedPrinter {
            id,
            name: name.to_string(),
        })
    }

    fn printer_defaults(&self, printer: &Self::Printer) -> Result<DeviceSettings, DeviceError> {
        self.require_live("printer_defaults", printer.id)?;
        let state = self.state();
        check_failing(&state, "printer_defaults")?;
        Ok(state.defaults)
    }

    fn close_printer(&self, printer: Self::Printer) -> Result<(), DeviceError> {
        self.release(
            "close_printer",
            printer.id,
            DeviceCall::ClosePrinter(printer.name),
        )
    }

    fn create_context(
        &self,
        printer: &str,
        settings: &DeviceSettings,
    ) -> Result<Self::Context, DeviceError> {
        let id = self.allocate("create_context")?;
        self.state().calls.push(DeviceCall::CreateContext {
            printer: printer.to_string(),
            settings: *settings,
        });
        Ok(RecordedHandle(id))
    }

    fn delete_context(&self, context: Self::Context) -> Result<(), DeviceError> {
        self.release("delete_context", context.0, DeviceCall::DeleteContext(context.0))
    }

    fn set_map_mode(&self, context: &Self::Context, mode: MapMode) -> Result<(), DeviceError> {
        self.require_live("set_map_mode", context.0)?;
        self.record("set_map_mode", DeviceCall::SetMapMode(mode))
    }

    fn device_caps(&self, context: &Self::Context, cap: DeviceCap) -> Result<i32, DeviceError> {
        self.require_live("device_caps", context.0)?;
        let state = self.state();
        check_failing(&state, "device_caps")?;
        Ok(state.caps.get(&cap).copied().unwrap_or(0))
    }

    fn start_doc(&self, context: &Self::Context, title: &str) -> Result<(), DeviceError> {
        self.require_live("start_doc", context.0)?;
        self.record("start_doc", DeviceCall::StartDoc(title.to_string()))
    }

    fn end_doc(&self, context: &Self::Context) -> Result<(), DeviceError> {
        self.require_live("end_doc", context.0)?;
        self.record("end_doc", DeviceCall::EndDoc)
    }

    fn start_page(&self, context: &Self::Context) -> Result<(), DeviceError> {
        self.require_live("start_page", context.0)?;
        self.record("start_page", DeviceCall::StartPage)
    }

    fn end_page(&self, context: &Self::Context) -> Result<(), DeviceError> {
        self.require_live("end_page", context.0)?;
        self.record("end_page", DeviceCall::EndPage)
    }

    fn create_pen(&self, context: &Self::Context, width: i32) -> Result<Self::Pen, DeviceError> {
        self.require_live("create_pen", context.0)?;
        let id = self.allocate("create_pen")?;
        self.state().calls.push(DeviceCall::CreatePen { id, width });
        Ok(RecordedHandle(id))
    }

    fn select_pen(&self, context: &Self::Context, pen: &Self::Pen) -> Result<(), DeviceError> {
        self.require_live("select_pen", context.0)?;
        self.require_live("select_pen", pen.0)?;
        self.record("select_pen", DeviceCall::SelectPen(pen.0))
    }

    fn delete_pen(&self, pen: Self::Pen) -> Result<(), DeviceError> {
        self.release("delete_pen", pen.0, DeviceCall::DeletePen(pen.0))
    }

    fn create_font(
        &self,
        context: &Self::Context,
        spec: &FontSpec,
    ) -> Result<Self::Font, DeviceError> {
        self.require_live("create_font", context.0)?;
        let id = self.allocate("create_font")?;
        self.state().calls.push(DeviceCall::CreateFont {
            id,
            spec: spec.clone(),
        });
        Ok(RecordedHandle(id))
    }

    fn select_font(&self, context: &Self::Context, font: &Self::Font) -> Result<(), DeviceError> {
        self.require_live("select_font", context.0)?;
        self.require_live("select_font", font.0)?;
        self.record("select_font", DeviceCall::SelectFont(font.0))
    }

    fn delete_font(&self, font: Self::Font) -> Result<(), DeviceError> {
        self.release("delete_font", font.0, DeviceCall::DeleteFont(font.0))
    }

    fn move_to(&self, context: &Self::Context, point: [i32; 2]) -> Result<(), DeviceError> {
        self.require_live("move_to", context.0)?;
        self.record("move_to", DeviceCall::MoveTo(point))
    }

    fn line_to(&self, context: &Self::Context, point: [i32; 2]) -> Result<(), DeviceError> {
        self.require_live("line_to", context.0)?;
        self.record("line_to", DeviceCall::LineTo(point))
    }

    fn text_out(
        &self,
        context: &Self::Context,
        point: [i32; 2],
        text: &str,
    ) -> Result<(), DeviceError> {
        self.require_live("text_out", context.0)?;
        self.record(
            "text_out",
            DeviceCall::TextOut {
                point,
                text: text.to_string(),
            },
        )
    }

    fn blit(
        &self,
        context: &Self::Context,
        raster: &Raster,
        dest: [i32; 4],
    ) -> Result<(), DeviceError> {
        self.require_live("blit", context.0)?;
        self.record(
            "blit",
            DeviceCall::Blit {
                width: raster.width,
                height: raster.height,
                dest,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_device_tracks_handles() {
        let device = RecordingDevice::new().with_default_printer("Office");
        let printer = device.open_printer("Office").unwrap();
        assert_eq!(printer.name(), "Office");
        assert_eq!(device.open_count(), 1);
        assert_eq!(device.live_handles().len(), 1);

        let context = device
            .create_context("Office", &DeviceSettings::default())
            .unwrap();
        device.close_printer(printer).unwrap();
        let pen = device.create_pen(&context, 20).unwrap();
        device.delete_pen(pen).unwrap();
        device.delete_context(context).unwrap();
        assert!(device.live_handles().is_empty());
    }

    #[test]
    fn unknown_printer_cannot_be_opened() {
        let device = RecordingDevice::new().with_default_printer("Office");
        let err = device.open_printer("Basement").unwrap_err();
        assert_eq!(err.operation, "open_printer");
        assert_eq!(device.open_count(), 0);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn injected_failures_name_the_operation() {
        let device = RecordingDevice::new().with_default_printer("Office");
        device.fail_on("enumerate_printers");
        let err = device.enumerate_printers().unwrap_err();
        assert_eq!(err.to_string(), "enumerate_printers failed: injected failure");
    }

    #[test]
    fn released_context_rejects_drawing() {
        let device = RecordingDevice::new().with_default_printer("Office");
        let context = device
            .create_context("Office", &DeviceSettings::default())
            .unwrap();
        let id = context.id();
        device.delete_context(context).unwrap();
        let err = device.move_to(&RecordedHandle(id), [0, 0]).unwrap_err();
        assert_eq!(err.operation, "move_to");
    }

    #[test]
    fn capability_indices_match_platform_numbering() {
        assert_eq!(DeviceCap::HorizontalResolution.index(), 8);
        assert_eq!(DeviceCap::VerticalResolution.index(), 10);
        assert_eq!(DeviceCap::HorizontalDpi.index(), 88);
        assert_eq!(DeviceCap::VerticalDpi.index(), 90);
        assert_eq!(DeviceCap::PhysicalWidth.index(), 110);
        assert_eq!(DeviceCap::PhysicalHeight.index(), 111);
        assert_eq!(MapMode::Twips.code(), 6);
    }
}
