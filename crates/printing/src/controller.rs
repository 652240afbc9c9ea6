use std::fmt;
use std::mem;

use tracing::{debug, warn};

use crate::error::PrintError;
use crate::font::{get_font, FontWeight};
use crate::job::PrintJobConfiguration;
use crate::platform::{DeviceApi, DeviceCap, DeviceError, MapMode};
use crate::raster::{self, RasterDecoder};
use crate::resolver;
use crate::transform::{to_device, SCALE};

/// Document title registered when a job is opened implicitly.
pub const DEFAULT_TITLE: &str = "pageprint print job";

/// Externally visible lifecycle state of a [`PrintJob`].
/// 列印作業對外可見的生命週期狀態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Unopened,
    Open,
    Closed,
}

struct OpenDocument<D: DeviceApi> {
    context: D::Context,
    pen: D::Pen,
    font: Option<D::Font>,
    page_active: bool,
}

enum Phase<D: DeviceApi> {
    Unopened,
    Open(OpenDocument<D>),
    Closed,
}

/// A multi-page print job on one device.
/// 單一裝置上的多頁列印作業。
///
/// Coordinates are points (1/72") measured from the top-left corner with y
/// growing downward. The device is opened by the first drawing or sizing
/// call, or explicitly with [`PrintJob::open`], and released by
/// [`PrintJob::close`].
pub struct PrintJob<D: DeviceApi> {
    device: D,
    config: PrintJobConfiguration,
    raster: Option<Box<dyn RasterDecoder>>,
    phase: Phase<D>,
    page: u32,
    printer: Option<String>,
}

impl<D: DeviceApi> PrintJob<D> {
    /// Creates an unopened job. Raster support is whatever this build
    /// provides (see [`raster::detect`]).
    pub fn new(device: D, config: PrintJobConfiguration) -> Self {
        Self {
            device,
            config,
            raster: raster::detect(),
            phase: Phase::Unopened,
            page: 0,
            printer: None,
        }
    }

    /// Replaces the raster decoder; `None` disables [`PrintJob::image`].
    pub fn with_raster(mut self, decoder: Option<Box<dyn RasterDecoder>>) -> Self {
        self.raster = decoder;
        self
    }

    pub fn state(&self) -> JobState {
        match self.phase {
            Phase::Unopened => JobState::Unopened,
            Phase::Open(_) => JobState::Open,
            Phase::Closed => JobState::Closed,
        }
    }

    /// Current page ordinal: 0 before the job opens, then 1, 2, ...
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Name of the printer the job was opened on.
    pub fn printer(&self) -> Option<&str> {
        self.printer.as_deref()
    }

    pub fn configuration(&self) -> &PrintJobConfiguration {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Opens the device and starts the document. Does nothing when the job
    /// is already open.
    pub fn open(&mut self, title: Option<&str>) -> Result<(), PrintError> {
        match self.phase {
            Phase::Open(_) => Ok(()),
            Phase::Closed => Err(PrintError::Closed),
            Phase::Unopened => self.begin(title.unwrap_or(DEFAULT_TITLE)),
        }
    }

    /// Finishes the current page. An empty page is still emitted. Does
    /// nothing before the job opens or after it closes.
    pub fn end_page(&mut self) -> Result<(), PrintError> {
        let Phase::Open(doc) = &mut self.phase else {
            return Ok(());
        };
        if !doc.page_active {
            self.device.start_page(&doc.context)?;
        }
        self.device.end_page(&doc.context)?;
        doc.page_active = false;
        self.page += 1;
        debug!(page = self.page, "ended page");
        Ok(())
    }

    /// Ends the document and releases every device resource. Safe to call
    /// repeatedly; only the first call on an open job does anything.
    ///
    /// Resources are released even when a device call fails; the first
    /// failure is returned and the job is closed regardless.
    pub fn close(&mut self) -> Result<(), PrintError> {
        if !matches!(self.phase, Phase::Open(_)) {
            return Ok(());
        }
        let Phase::Open(doc) = mem::replace(&mut self.phase, Phase::Closed) else {
            return Ok(());
        };
        debug!(pages = self.page, "closing print job");
        release(&self.device, doc).map_err(PrintError::from)
    }

    /// Printable `(width, height)` in points.
    pub fn printable_size(&mut self) -> Result<(f32, f32), PrintError> {
        self.size_from(DeviceCap::HorizontalResolution, DeviceCap::VerticalResolution)
    }

    /// Full paper `(width, height)` in points, margins included.
    pub fn physical_size(&mut self) -> Result<(f32, f32), PrintError> {
        self.size_from(DeviceCap::PhysicalWidth, DeviceCap::PhysicalHeight)
    }

    pub fn line(&mut self, from: [f32; 2], to: [f32; 2]) -> Result<(), PrintError> {
        let (device, context) = self.page_surface()?;
        device.move_to(context, to_device(from))?;
        device.line_to(context, to_device(to))?;
        Ok(())
    }

    /// Strokes the outline of `[x0, y0, x1, y1]`. Never filled.
    pub fn rectangle(&mut self, rect: [f32; 4]) -> Result<(), PrintError> {
        let [x0, y0, x1, y1] = rect;
        let (device, context) = self.page_surface()?;
        device.move_to(context, to_device([x0, y0]))?;
        for corner in [[x1, y0], [x1, y1], [x0, y1], [x0, y0]] {
            device.line_to(context, to_device(corner))?;
        }
        Ok(())
    }

    pub fn text(&mut self, position: [f32; 2], text: &str) -> Result<(), PrintError> {
        let (device, context) = self.page_surface()?;
        device.text_out(context, to_device(position), text)?;
        Ok(())
    }

    /// Selects a new font; the previously selected one is released.
    pub fn set_font(&mut self, family: &str, size_pt: f32, bold: bool) -> Result<(), PrintError> {
        let (device, doc) = self.document()?;
        let font = get_font(device, &doc.context, family, size_pt, FontWeight::from_bold(bold))?;
        if let Err(err) = device.select_font(&doc.context, &font) {
            discard(device.delete_font(font));
            return Err(err.into());
        }
        debug!(family, size_pt, bold, "selected font");
        if let Some(previous) = doc.font.replace(font) {
            device.delete_font(previous)?;
        }
        Ok(())
    }

    /// Draws encoded image data into the box at `position` spanning `size`
    /// points.
    pub fn image(
        &mut self,
        position: [f32; 2],
        data: &[u8],
        size: [f32; 2],
    ) -> Result<(), PrintError> {
        let decoder = self
            .raster
            .as_ref()
            .ok_or(PrintError::CapabilityUnavailable("raster image"))?;
        let raster = decoder.decode(data)?;
        let [x, y] = position;
        let [width, height] = size;
        let dest = to_device([x, y, x + width, y + height]);
        let (device, context) = self.page_surface()?;
        device.blit(context, &raster, dest)?;
        Ok(())
    }

    /// Reserved; has no effect.
    pub fn set_ink<I>(&self, _ink: I) {}

    /// Reserved; has no effect. Shapes are always stroked.
    pub fn set_fill(&self, _fill: bool) {}

    fn begin(&mut self, title: &str) -> Result<(), PrintError> {
        let resolved = resolver::resolve(&self.device, &self.config)?;
        let context = self
            .device
            .create_context(&resolved.printer, &resolved.settings)
            .map_err(|source| PrintError::DeviceUnavailable {
                name: Some(resolved.printer.clone()),
                source,
            })?;

        let pen = match self.prepare(&context, title) {
            Ok(pen) => pen,
            Err(err) => {
                discard(self.device.delete_context(context));
                return Err(err);
            }
        };

        debug!(printer = %resolved.printer, title, "opened print job");
        self.phase = Phase::Open(OpenDocument {
            context,
            pen,
            font: None,
            page_active: false,
        });
        self.page = 1;
        self.printer = Some(resolved.printer);
        Ok(())
    }

    fn prepare(&self, context: &D::Context, title: &str) -> Result<D::Pen, PrintError> {
        self.device.set_map_mode(context, MapMode::Twips)?;
        self.device.start_doc(context, title)?;
        let pen = self.device.create_pen(context, SCALE)?;
        if let Err(err) = self.device.select_pen(context, &pen) {
            discard(self.device.delete_pen(pen));
            return Err(err.into());
        }
        Ok(pen)
    }

    fn document(&mut self) -> Result<(&D, &mut OpenDocument<D>), PrintError> {
        if matches!(self.phase, Phase::Unopened) {
            self.begin(DEFAULT_TITLE)?;
        }
        match &mut self.phase {
            Phase::Open(doc) => Ok((&self.device, doc)),
            _ => Err(PrintError::Closed),
        }
    }

    fn page_surface(&mut self) -> Result<(&D, &D::Context), PrintError> {
        let (device, doc) = self.document()?;
        if !doc.page_active {
            device.start_page(&doc.context)?;
            doc.page_active = true;
        }
        Ok((device, &doc.context))
    }

    fn size_from(&mut self, width: DeviceCap, height: DeviceCap) -> Result<(f32, f32), PrintError> {
        let (device, doc) = self.document()?;
        let width = to_points(
            device.device_caps(&doc.context, width)?,
            device.device_caps(&doc.context, DeviceCap::HorizontalDpi)?,
        )?;
        let height = to_points(
            device.device_caps(&doc.context, height)?,
            device.device_caps(&doc.context, DeviceCap::VerticalDpi)?,
        )?;
        Ok((width, height))
    }
}

impl<D: DeviceApi> Drop for PrintJob<D> {
    fn drop(&mut self) {
        if let Phase::Open(doc) = mem::replace(&mut self.phase, Phase::Closed) {
            warn!(page = self.page, "print job dropped while open; releasing it");
            discard(release(&self.device, doc));
        }
    }
}

impl<D: DeviceApi> fmt::Debug for PrintJob<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintJob")
            .field("state", &self.state())
            .field("page", &self.page)
            .field("printer", &self.printer)
            .field("config", &self.config)
            .field("raster", &self.raster.is_some())
            .finish()
    }
}

fn to_points(units: i32, dpi: i32) -> Result<f32, DeviceError> {
    if dpi <= 0 {
        return Err(DeviceError::new(
            "device_caps",
            format!("device reported {dpi} dots per inch"),
        ));
    }
    Ok((f64::from(units) * 72.0 / f64::from(dpi)) as f32)
}

/// Ends the active page and the document, then releases the context, pen
/// and font. Every step runs; the first failure is returned.
fn release<D: DeviceApi>(device: &D, doc: OpenDocument<D>) -> Result<(), DeviceError> {
    let OpenDocument {
        context,
        pen,
        font,
        page_active,
    } = doc;

    let mut first_error = None;
    let mut note = |result: Result<(), DeviceError>| {
        if let Err(err) = result {
            warn!(error = %err, "device call failed while closing");
            first_error.get_or_insert(err);
        }
    };

    if page_active {
        note(device.end_page(&context));
    }
    note(device.end_doc(&context));
    note(device.delete_context(context));
    note(device.delete_pen(pen));
    if let Some(font) = font {
        note(device.delete_font(font));
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn discard<E: fmt::Display>(result: Result<(), E>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to release device resource");
    }
}
