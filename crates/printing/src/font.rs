use crate::platform::{DeviceApi, DeviceError};
use crate::transform::scale_length;

/// Stroke weight of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub const fn value(self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }

    pub const fn from_bold(bold: bool) -> Self {
        if bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        }
    }
}

/// Font parameters as handed to the device, already in device units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub height: i32,
    pub weight: u16,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_pt: f32, weight: FontWeight) -> Self {
        Self {
            family: family.into(),
            height: scale_length(size_pt),
            weight: weight.value(),
        }
    }
}

/// Creates a new device font for `family` at `size_pt` points.
///
/// Every call allocates a fresh resource; releasing it is up to the caller.
/// If the family is not installed the platform substitutes another one.
pub fn get_font<D: DeviceApi>(
    device: &D,
    context: &D::Context,
    family: &str,
    size_pt: f32,
    weight: FontWeight,
) -> Result<D::Font, DeviceError> {
    device.create_font(context, &FontSpec::new(family, size_pt, weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{DeviceCall, DeviceSettings, RecordingDevice};

    #[test]
    fn spec_is_scaled_to_device_units() {
        let spec = FontSpec::new("Arial", 32.0, FontWeight::Normal);
        assert_eq!(spec.height, 640);
        assert_eq!(spec.weight, 400);
        assert_eq!(FontSpec::new("Arial", 10.0, FontWeight::Bold).weight, 700);
    }

    #[test]
    fn each_call_allocates_a_new_font() {
        let device = RecordingDevice::new().with_default_printer("Office");
        let context = device
            .create_context("Office", &DeviceSettings::default())
            .unwrap();
        let first = get_font(&device, &context, "Courier", 12.0, FontWeight::Normal).unwrap();
        let second = get_font(&device, &context, "Courier", 12.0, FontWeight::Normal).unwrap();
        assert_ne!(first.id(), second.id());

        let created = device
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DeviceCall::CreateFont { .. }))
            .count();
        assert_eq!(created, 2);
    }
}
