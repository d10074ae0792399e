//! tinytty — the logical core of an emulated character-oriented serial
//! port driver.
//!
//! No hardware backs this crate: received data is synthesized by a
//! per-port periodic timer, transmitted data drains from a ring buffer
//! into a pluggable [`Backend`], and line configuration (baud, parity,
//! stop bits, flow control) is tracked for diagnostics. A host terminal
//! layer drives the port through [`Port`] and receives data through the
//! [`LineSink`] it attaches.
//!
//! # Modules
//!
//! - `ring`: fixed-capacity transmit ring buffer
//! - `line`: line configuration and divisor math
//! - `engine`: transmit drain cycle
//! - `emulator`: timer-driven receive synthesis
//! - `port`: port state, lifecycle, and the capability traits
//! - `error`: unified error handling

pub mod emulator;
pub mod engine;
pub mod error;
pub mod line;
pub mod port;
pub mod ring;

// Re-export commonly used types for convenience
pub use emulator::{DEFAULT_TICK, EMULATED_CHAR};
pub use engine::WAKEUP_CHARS;
pub use error::UartError;
pub use line::{uart_divisor, DataBits, LineConfig, LineRequest, Parity, StopBits, UART_CLK};
pub use port::mock::{CapturingBackend, MockLine};
pub use port::{
    Backend, Counters, EmulatedBackend, LineSink, Port, PortOptions, PortSnapshot, RxStatus,
    DEFAULT_FIFO_SIZE,
};
pub use ring::{TxRing, XMIT_SIZE};
