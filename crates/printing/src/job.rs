use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Setting named by a [`ConfigurationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    PaperSize,
    Orientation,
    Duplex,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Setting::PaperSize => "paper size",
            Setting::Orientation => "orientation",
            Setting::Duplex => "duplex mode",
        };
        f.write_str(name)
    }
}

/// A mnemonic that has no entry in the lookup table for its setting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {setting} `{value}`")]
pub struct ConfigurationError {
    pub setting: Setting,
    pub value: String,
}

impl ConfigurationError {
    pub fn new(setting: Setting, value: impl Into<String>) -> Self {
        Self {
            setting,
            value: value.into(),
        }
    }
}

/// Paper sizes that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperSize {
    Letter,
    LetterSmall,
    Tabloid,
    Ledger,
    Legal,
    Statement,
    Executive,
    A3,
    A4,
    Envelope9,
    Envelope10,
    Envelope11,
    Envelope12,
    Envelope14,
    Fanfold,
}

impl PaperSize {
    pub const ALL: [PaperSize; 15] = [
        PaperSize::Letter,
        PaperSize::LetterSmall,
        PaperSize::Tabloid,
        PaperSize::Ledger,
        PaperSize::Legal,
        PaperSize::Statement,
        PaperSize::Executive,
        PaperSize::A3,
        PaperSize::A4,
        PaperSize::Envelope9,
        PaperSize::Envelope10,
        PaperSize::Envelope11,
        PaperSize::Envelope12,
        PaperSize::Envelope14,
        PaperSize::Fanfold,
    ];

    /// Device paper code.
    pub const fn code(self) -> i16 {
        match self {
            PaperSize::Letter => 1,
            PaperSize::LetterSmall => 2,
            PaperSize::Tabloid => 3,
            PaperSize::Ledger => 4,
            PaperSize::Legal => 5,
            PaperSize::Statement => 6,
            PaperSize::Executive => 7,
            PaperSize::A3 => 8,
            PaperSize::A4 => 9,
            PaperSize::Envelope9 => 19,
            PaperSize::Envelope10 => 20,
            PaperSize::Envelope11 => 21,
            PaperSize::Envelope12 => 22,
            PaperSize::Envelope14 => 23,
            PaperSize::Fanfold => 39,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            PaperSize::Letter => "letter",
            PaperSize::LetterSmall => "lettersmall",
            PaperSize::Tabloid => "tabloid",
            PaperSize::Ledger => "ledger",
            PaperSize::Legal => "legal",
            PaperSize::Statement => "statement",
            PaperSize::Executive => "executive",
            PaperSize::A3 => "a3",
            PaperSize::A4 => "a4",
            PaperSize::Envelope9 => "envelope9",
            PaperSize::Envelope10 => "envelope10",
            PaperSize::Envelope11 => "envelope11",
            PaperSize::Envelope12 => "envelope12",
            PaperSize::Envelope14 => "envelope14",
            PaperSize::Fanfold => "fanfold",
        }
    }
}

impl FromStr for PaperSize {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        PaperSize::ALL
            .iter()
            .copied()
            .find(|paper| paper.mnemonic().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::new(Setting::PaperSize, value))
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Requested paper: either a raw device code, passed through untouched, or a
/// named size from the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaperRepr", into = "PaperRepr")]
pub enum PaperSetting {
    Code(i16),
    Named(PaperSize),
}

impl PaperSetting {
    pub const fn code(self) -> i16 {
        match self {
            PaperSetting::Code(code) => code,
            PaperSetting::Named(paper) => paper.code(),
        }
    }
}

impl From<PaperSize> for PaperSetting {
    fn from(paper: PaperSize) -> Self {
        PaperSetting::Named(paper)
    }
}

impl From<i16> for PaperSetting {
    fn from(code: i16) -> Self {
        PaperSetting::Code(code)
    }
}

impl FromStr for PaperSetting {
    type Err = ConfigurationError;

    /// Decimal strings are raw codes; anything else must be a known mnemonic.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().parse::<i16>() {
            Ok(code) => Ok(PaperSetting::Code(code)),
            Err(_) => value.parse().map(PaperSetting::Named),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PaperRepr {
    Code(i16),
    Name(String),
}

impl TryFrom<PaperRepr> for PaperSetting {
    type Error = ConfigurationError;

    fn try_from(repr: PaperRepr) -> Result<Self, Self::Error> {
        match repr {
            PaperRepr::Code(code) => Ok(PaperSetting::Code(code)),
            PaperRepr::Name(name) => name.parse().map(PaperSetting::Named),
        }
    }
}

impl From<PaperSetting> for PaperRepr {
    fn from(setting: PaperSetting) -> Self {
        match setting {
            PaperSetting::Code(code) => PaperRepr::Code(code),
            PaperSetting::Named(paper) => PaperRepr::Name(paper.mnemonic().to_string()),
        }
    }
}

/// Orientation of a print page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub const fn code(self) -> i16 {
        match self {
            Orientation::Portrait => 1,
            Orientation::Landscape => 2,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(ConfigurationError::new(Setting::Orientation, value)),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Orientation> for String {
    fn from(orientation: Orientation) -> Self {
        orientation.mnemonic().to_string()
    }
}

/// Duplex (two-sided) printing mode.
///
/// `none` and `normal` are both accepted for one-sided printing and share a
/// device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DuplexMode {
    Off,
    LongEdge,
    ShortEdge,
}

impl DuplexMode {
    pub const fn code(self) -> i16 {
        match self {
            DuplexMode::Off => 1,
            DuplexMode::LongEdge => 2,
            DuplexMode::ShortEdge => 3,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            DuplexMode::Off => "none",
            DuplexMode::LongEdge => "long",
            DuplexMode::ShortEdge => "short",
        }
    }
}

impl FromStr for DuplexMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "normal" => Ok(DuplexMode::Off),
            "long" | "long-edge" => Ok(DuplexMode::LongEdge),
            "short" | "short-edge" => Ok(DuplexMode::ShortEdge),
            _ => Err(ConfigurationError::new(Setting::Duplex, value)),
        }
    }
}

impl TryFrom<String> for DuplexMode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DuplexMode> for String {
    fn from(duplex: DuplexMode) -> Self {
        duplex.mnemonic().to_string()
    }
}

/// Settings requested for a print job. Every field left as `None` inherits
/// the device default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper: Option<PaperSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplex: Option<DuplexMode>,
}

impl PrintJobConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_printer(mut self, name: impl Into<String>) -> Self {
        self.printer = Some(name.into());
        self
    }

    pub fn with_paper(mut self, paper: impl Into<PaperSetting>) -> Self {
        self.paper = Some(paper.into());
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_duplex(mut self, duplex: DuplexMode) -> Self {
        self.duplex = Some(duplex);
        self
    }

    /// Builds a configuration from mnemonic strings, validating each one.
    pub fn from_mnemonics(
        printer: Option<&str>,
        paper: Option<&str>,
        orientation: Option<&str>,
        duplex: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            printer: printer.map(str::to_string),
            paper: paper.map(str::parse).transpose()?,
            orientation: orientation.map(str::parse).transpose()?,
            duplex: duplex.map(str::parse).transpose()?,
        })
    }
}
