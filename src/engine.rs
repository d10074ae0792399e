//! Transmit drain cycle.
//!
//! One drain call services the transmit side of a single scheduling tick:
//! a pending out-of-band `x_char` preempts the ring, otherwise up to half a
//! FIFO's worth of bytes leaves the ring in FIFO order.

use crate::port::traits::{Backend, LineSink};
use crate::port::PortShared;
use tracing::debug;

/// Low-water mark: once the backlog drops below this many pending bytes,
/// the producer is signalled to enqueue more data.
pub const WAKEUP_CHARS: usize = 256;

/// Mark transmission stopped.
pub(crate) fn stop_tx(shared: &mut PortShared) {
    shared.tx_stopped = true;
    debug!("stop_tx");
}

/// Drain the transmit ring for one cycle.
///
/// Must be called with the port lock held and only while the port is open.
/// At most `fifo_size / 2` bytes leave per call; never blocks, never
/// allocates.
pub(crate) fn drain(shared: &mut PortShared, backend: &dyn Backend, sink: &dyn LineSink) {
    // A pending control byte bypasses the ring entirely.
    if let Some(ch) = shared.x_char.take() {
        debug!("x_char wrote 0x{ch:02x}");
        backend.send_byte(ch);
        shared.icount.tx += 1;
        return;
    }

    if shared.xmit.is_empty() || shared.tx_stopped {
        stop_tx(shared);
        return;
    }

    let before = shared.xmit.pending();
    let mut quota = shared.fifo_size >> 1;
    while quota > 0 {
        let Some(byte) = shared.xmit.take() else { break };
        backend.send_byte(byte);
        shared.icount.tx += 1;
        quota -= 1;
    }

    let after = shared.xmit.pending();
    if before >= WAKEUP_CHARS && after < WAKEUP_CHARS {
        sink.write_wakeup();
    }

    if shared.xmit.is_empty() {
        stop_tx(shared);
    }
}
