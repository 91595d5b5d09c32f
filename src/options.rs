//! Options-string parsing.
//!
//! A port is described by a flat `key=value;key=value` string, e.g.
//! `baudrate=9600;parity=even;autocts=off`. Parsing never touches a device;
//! the numeric and parity values are only checked when the line is
//! configured, see [`crate::line`].

use crate::error::ConfigError;
use crate::trace::driver_debug;
use std::fmt;

/// Baud rates the line configurator can program.
pub const SUPPORTED_BAUD_RATES: [i32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// The parsed options record.
///
/// Numeric fields hold whatever the options string said (non-numeric text
/// reads as 0) and `parity` keeps the raw text; validation is deferred to
/// the typed accessors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOptions {
    pub baud_rate: i32,
    pub bits_per_char: i32,
    pub stop_bits: i32,
    pub parity: String,
    /// Accepted but not implemented: the port always blocks.
    pub blocking: bool,
    pub auto_cts: bool,
    pub auto_rts: bool,
}

impl Default for PortOptions {
    fn default() -> Self {
        Self {
            baud_rate: 57600,
            bits_per_char: 8,
            stop_bits: 1,
            parity: "none".to_string(),
            blocking: true,
            auto_cts: true,
            auto_rts: true,
        }
    }
}

impl PortOptions {
    /// Parse an options string. `None` and `""` give the defaults.
    ///
    /// Unknown keys do not stop parsing: every recognised pair is applied and
    /// the error for the last unknown key is returned once the whole string
    /// has been consumed.
    pub fn parse(input: Option<&str>) -> Result<Self, ConfigError> {
        match Self::parse_lenient(input) {
            (_, Some(err)) => Err(err),
            (options, None) => Ok(options),
        }
    }

    /// Parse an options string, returning the record built so far together
    /// with the pending unknown-key error, if any.
    ///
    /// Scanning stops silently at a segment with no `=` or at an empty
    /// remainder after a trailing `;`. An empty `;;` segment is not a stop:
    /// its `;` becomes part of the following key.
    pub fn parse_lenient(input: Option<&str>) -> (Self, Option<ConfigError>) {
        let mut options = Self::default();
        let mut pending = None;
        let mut rest = input.unwrap_or_default();

        driver_debug!("options: {}", rest);

        while !rest.is_empty() {
            let Some((key, tail)) = rest.split_once('=') else {
                break;
            };
            let (value, next) = match tail.split_once(';') {
                Some((value, next)) => (value, Some(next)),
                None => (tail, None),
            };
            driver_debug!("option {} = {}", key, value);

            if let Err(err) = options.apply(key, value) {
                pending = Some(err);
            }

            match next {
                Some(next) => rest = next,
                None => break,
            }
        }

        (options, pending)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "baudrate" => self.baud_rate = parse_int(value),
            "bitsperchar" => self.bits_per_char = parse_int(value),
            "stopbits" => self.stop_bits = parse_int(value),
            "parity" => self.parity = value.to_string(),
            "blocking" => self.blocking = value == "on",
            "autocts" => self.auto_cts = value == "on",
            "autorts" => self.auto_rts = value == "on",
            _ => return Err(ConfigError::InvalidOption(key.to_string())),
        }
        Ok(())
    }

    pub fn data_bits(&self) -> Result<DataBits, ConfigError> {
        DataBits::try_from(self.bits_per_char)
    }

    pub fn parity(&self) -> Result<Parity, ConfigError> {
        Parity::from_option(&self.parity)
    }

    pub fn stop_bits(&self) -> Result<StopBits, ConfigError> {
        StopBits::try_from(self.stop_bits)
    }

    /// RTS/CTS handshaking is only enabled when both directions are requested.
    pub fn hardware_flow_control(&self) -> bool {
        self.auto_rts && self.auto_cts
    }

    /// Render the record back into options-string form.
    pub fn to_options_string(&self) -> String {
        format!(
            "baudrate={};bitsperchar={};stopbits={};parity={};blocking={};autocts={};autorts={}",
            self.baud_rate,
            self.bits_per_char,
            self.stop_bits,
            self.parity,
            on_off(self.blocking),
            on_off(self.auto_cts),
            on_off(self.auto_rts),
        )
    }
}

impl fmt::Display for PortOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_options_string())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Lenient decimal parse: optional leading whitespace and sign, then digits
/// up to the first non-digit. Anything unparsable is 0.
fn parse_int(value: &str) -> i32 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let limit = i64::from(i32::MAX) + 1;
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| (acc * 10 + i64::from(b - b'0')).min(limit));

    let signed = if negative { -magnitude } else { magnitude };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Character size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

impl TryFrom<i32> for DataBits {
    type Error = ConfigError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        match bits {
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(ConfigError::UnsupportedDataSize(other)),
        }
    }
}

impl From<DataBits> for i32 {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Parity {
    /// Only the first character of the option value matters, case-insensitively.
    pub fn from_option(value: &str) -> Result<Self, ConfigError> {
        match value.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('n') => Ok(Self::None),
            Some('o') => Ok(Self::Odd),
            Some('e') => Ok(Self::Even),
            _ => Err(ConfigError::UnsupportedParity(value.to_string())),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Odd => "odd",
            Self::Even => "even",
        })
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl TryFrom<i32> for StopBits {
    type Error = ConfigError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(ConfigError::UnsupportedStopBits(other)),
        }
    }
}

impl From<StopBits> for i32 {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}
