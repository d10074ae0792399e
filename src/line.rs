//! Line configuration: negotiated serial parameters and divisor math.
//!
//! There is no hardware behind this driver, so the classified format is
//! diagnostic only. It is logged and stored for inspection but never feeds
//! back into framing of the synthesized receive data.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reference input clock of the emulated UART, in Hz.
pub const UART_CLK: u32 = 3_672_000;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    /// Classify a raw data-bit count. Unrecognized counts fall back to
    /// eight bits, mirroring permissive hardware defaults.
    pub fn classify(bits: u8) -> Self {
        match bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        }
    }

    pub fn count(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    One,
    Two,
}

/// A line configuration change requested by the upper layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    /// Raw data-bit count; anything outside 5..=7 classifies as 8.
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// RTS/CTS hardware flow control.
    pub hw_flow: bool,
    /// Requested baud rate; 0 means "no rate requested".
    pub baud: u32,
}

impl Default for LineRequest {
    fn default() -> Self {
        Self {
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            hw_flow: false,
            baud: 9600,
        }
    }
}

/// Standard UART divisor for a target baud rate: `clock / (16 * baud)`,
/// rounded to the nearest integer.
pub fn uart_divisor(clock: u32, baud: u32) -> u32 {
    (clock + baud * 8) / (baud * 16)
}

/// The currently negotiated serial parameters for one port.
#[derive(Debug, Clone, Serialize)]
pub struct LineConfig {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub hw_flow: bool,
    pub baud: u32,
    /// Counter setting that would produce `baud` on real hardware.
    pub divisor: u32,
    /// Reference clock frequency, fixed per port.
    pub clock: u32,
}

impl LineConfig {
    /// 8N1 at 9600 baud, no flow control.
    pub fn new(clock: u32) -> Self {
        let baud = 9600;
        Self {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            hw_flow: false,
            baud,
            divisor: uart_divisor(clock, baud),
            clock,
        }
    }

    /// Apply a requested configuration.
    ///
    /// Classification failures degrade to defaults and a zero baud rate
    /// keeps the previously computed divisor, so this never fails.
    pub fn apply(&mut self, req: &LineRequest) {
        self.data_bits = DataBits::classify(req.data_bits);
        self.parity = req.parity;
        self.stop_bits = req.stop_bits;
        self.hw_flow = req.hw_flow;
        debug!(
            data_bits = self.data_bits.count(),
            parity = ?self.parity,
            stop_bits = ?self.stop_bits,
            rts_cts = self.hw_flow,
            "line format"
        );

        if req.baud == 0 {
            warn!(divisor = self.divisor, "requested baud rate is 0, not applied");
            return;
        }
        self.baud = req.baud;
        self.divisor = uart_divisor(self.clock, req.baud);
        debug!(baud = self.baud, divisor = self.divisor, "baud rate applied");
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::new(UART_CLK)
    }
}
