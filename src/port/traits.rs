//! Capability traits at the hardware and line-discipline seams.
//!
//! [`Backend`] is the hardware capability surface: the emulated baseline
//! has no hardware, so every method carries a trivial default and a real
//! backend overrides only what it needs. [`LineSink`] is the upward
//! delivery channel into the line-discipline/terminal layer.

use crate::error::UartError;
use crate::line::LineRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Per-byte receive status delivered alongside each byte.
///
/// The emulator only ever produces [`RxStatus::Normal`]; the other variants
/// exist for real-hardware backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RxStatus {
    Normal,
    FramingError,
    ParityError,
    Overrun,
}

/// Upward delivery channel into the line-discipline/terminal layer.
pub trait LineSink: Send + Sync {
    /// Deliver one received byte with its status flag.
    fn push_char(&self, byte: u8, status: RxStatus);

    /// Make previously delivered bytes visible to the upper layer.
    fn flush(&self);

    /// The transmit backlog dropped below the low-water mark; more output
    /// data may be enqueued.
    fn write_wakeup(&self);
}

/// Hardware capability surface of a port.
pub trait Backend: Send + Sync {
    /// Whether the hardware transmit path has fully drained. The emulated
    /// baseline has no transmit latch, so it always reports empty.
    fn tx_empty(&self) -> bool {
        trace!("tx_empty");
        true
    }

    fn get_mctrl(&self) -> u32 {
        trace!("get_mctrl");
        0
    }

    fn set_mctrl(&self, _bits: u32) {
        trace!("set_mctrl");
    }

    fn break_ctl(&self, _enabled: bool) {
        trace!("break_ctl");
    }

    fn enable_ms(&self) {
        trace!("enable_ms");
    }

    /// Emit one byte on the wire.
    fn send_byte(&self, byte: u8) {
        debug!("xmit wrote 0x{byte:02x}");
    }

    fn driver_name(&self) -> &str {
        "tinytty"
    }

    fn request_resources(&self) -> Result<(), UartError> {
        trace!("request_resources");
        Ok(())
    }

    fn release_resources(&self) {
        trace!("release_resources");
    }

    fn configure_resources(&self, _flags: u32) {
        trace!("configure_resources");
    }

    fn verify_resources(&self, _requested: &LineRequest) -> Result<(), UartError> {
        trace!("verify_resources");
        Ok(())
    }
}

/// The no-hardware baseline: transmitted bytes go to the log and every
/// stub keeps its default behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmulatedBackend;

impl Backend for EmulatedBackend {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emulated_backend_defaults() {
        let backend = EmulatedBackend;
        assert!(backend.tx_empty());
        assert_eq!(backend.get_mctrl(), 0);
        assert_eq!(backend.driver_name(), "tinytty");
        assert!(backend.request_resources().is_ok());
        assert!(backend.verify_resources(&LineRequest::default()).is_ok());
        // Pure no-ops; just exercise them.
        backend.set_mctrl(0x3);
        backend.break_ctl(true);
        backend.enable_ms();
        backend.configure_resources(0);
        backend.release_resources();
        backend.send_byte(b'x');
    }
}
