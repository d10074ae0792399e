//! Port state, lifecycle, and the host-facing operation surface.
//!
//! A [`Port`] bundles the shared mutable state (transmit ring, line
//! configuration, flags, counters) with a pluggable [`Backend`] and an
//! optional upward [`LineSink`]. The host opens the port with
//! [`Port::startup`], which arms the receive emulator, and closes it with
//! [`Port::shutdown`], which cancels the emulator synchronously.

pub mod mock;
pub mod traits;

pub use traits::{Backend, EmulatedBackend, LineSink, RxStatus};

use crate::emulator::{ReceiveEmulator, DEFAULT_TICK};
use crate::engine;
use crate::error::UartError;
use crate::line::{LineConfig, LineRequest, UART_CLK};
use crate::ring::{TxRing, XMIT_SIZE};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace};

/// Emulated hardware FIFO depth; the drain quota is half of this.
pub const DEFAULT_FIFO_SIZE: usize = 16;

/// Monotonic per-port transfer counters.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Counters {
    /// Bytes transmitted (ring and x_char).
    pub tx: u64,
    /// Bytes received (synthesized).
    pub rx: u64,
}

/// Mutable state shared between the request path and the timer task.
#[derive(Debug)]
pub(crate) struct PortShared {
    pub(crate) open: bool,
    pub(crate) xmit: TxRing,
    pub(crate) line: LineConfig,
    /// Out-of-band priority byte; bypasses the ring on the next drain.
    pub(crate) x_char: Option<u8>,
    pub(crate) tx_stopped: bool,
    pub(crate) rx_stopped: bool,
    pub(crate) icount: Counters,
    pub(crate) fifo_size: usize,
}

/// Slot holding the currently attached upward delivery channel.
pub(crate) type SinkSlot = Arc<Mutex<Option<Arc<dyn LineSink>>>>;

/// Construction-time knobs for a port.
#[derive(Debug, Clone)]
pub struct PortOptions {
    /// Transmit ring capacity; must be a power of two.
    pub xmit_capacity: usize,
    /// Emulated hardware FIFO depth.
    pub fifo_size: usize,
    /// Receive emulator tick interval.
    pub tick: Duration,
    /// Reference clock for divisor computation, in Hz.
    pub clock: u32,
}

impl Default for PortOptions {
    fn default() -> Self {
        Self {
            xmit_capacity: XMIT_SIZE,
            fifo_size: DEFAULT_FIFO_SIZE,
            tick: DEFAULT_TICK,
            clock: UART_CLK,
        }
    }
}

/// One emulated serial port.
pub struct Port {
    shared: Arc<Mutex<PortShared>>,
    backend: Arc<dyn Backend>,
    sink: SinkSlot,
    emulator: Mutex<Option<ReceiveEmulator>>,
    tick: Duration,
}

impl Port {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_options(backend, PortOptions::default())
    }

    pub fn with_options(backend: Arc<dyn Backend>, opts: PortOptions) -> Self {
        Self {
            shared: Arc::new(Mutex::new(PortShared {
                open: false,
                xmit: TxRing::with_capacity(opts.xmit_capacity),
                line: LineConfig::new(opts.clock),
                x_char: None,
                tx_stopped: false,
                rx_stopped: false,
                icount: Counters::default(),
                fifo_size: opts.fifo_size,
            })),
            backend,
            sink: Arc::new(Mutex::new(None)),
            emulator: Mutex::new(None),
            tick: opts.tick,
        }
    }

    /// Attach the upward delivery channel, replacing any previous sink.
    pub fn set_sink(&self, sink: Arc<dyn LineSink>) {
        *self.sink.lock() = Some(sink);
    }

    /// Detach the upward delivery channel. Subsequent emulator ticks skip
    /// delivery until a sink is attached again.
    pub fn clear_sink(&self) {
        *self.sink.lock() = None;
    }

    // ----- lifecycle -----

    /// Open the port: claim backend resources and arm the receive emulator.
    ///
    /// The first timer fire happens no earlier than one full tick after
    /// this returns. A tokio runtime must be current on the calling
    /// thread; its absence is the resource-exhaustion path, reported with
    /// nothing armed and the port left closed.
    pub fn startup(&self) -> Result<(), UartError> {
        trace!("startup");
        let mut slot = self.emulator.lock();
        if slot.is_some() {
            return Err(UartError::AlreadyStarted);
        }

        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| UartError::resource_exhausted("no timer runtime available"))?;
        self.backend.request_resources()?;

        {
            let mut st = self.shared.lock();
            st.open = true;
            st.tx_stopped = false;
            st.rx_stopped = false;
        }

        *slot = Some(ReceiveEmulator::arm(
            &handle,
            Arc::downgrade(&self.shared),
            Arc::clone(&self.sink),
            Arc::clone(&self.backend),
            self.tick,
        ));
        info!(driver = self.backend.driver_name(), "port started");
        Ok(())
    }

    /// Close the port. Idempotent: shutting down a never-started or
    /// already-closed port is a no-op.
    ///
    /// When this returns, the timer task has finished and no further fire
    /// will execute against this port's state.
    pub async fn shutdown(&self) {
        trace!("shutdown");
        let emulator = self.emulator.lock().take();

        {
            let mut st = self.shared.lock();
            st.open = false;
            st.tx_stopped = true;
            st.xmit.clear();
        }

        if let Some(emulator) = emulator {
            emulator.cancel().await;
            self.backend.release_resources();
            info!("port shut down");
        }
    }

    // ----- capability surface -----

    pub fn tx_empty(&self) -> bool {
        self.backend.tx_empty()
    }

    pub fn get_mctrl(&self) -> u32 {
        self.backend.get_mctrl()
    }

    pub fn set_mctrl(&self, bits: u32) {
        self.backend.set_mctrl(bits);
    }

    pub fn break_ctl(&self, enabled: bool) {
        self.backend.break_ctl(enabled);
    }

    pub fn enable_ms(&self) {
        self.backend.enable_ms();
    }

    pub fn driver_name(&self) -> &str {
        self.backend.driver_name()
    }

    pub fn request_resources(&self) -> Result<(), UartError> {
        self.backend.request_resources()
    }

    pub fn release_resources(&self) {
        self.backend.release_resources();
    }

    pub fn configure_resources(&self, flags: u32) {
        self.backend.configure_resources(flags);
    }

    pub fn verify_resources(&self, requested: &LineRequest) -> Result<(), UartError> {
        self.backend.verify_resources(requested)
    }

    /// Apply a requested line configuration. A zero baud rate is ignored
    /// with a warning and the prior divisor kept; everything else takes
    /// effect no later than the next drain cycle.
    pub fn set_line_config(&self, req: &LineRequest) {
        trace!("set_line_config");
        self.shared.lock().line.apply(req);
    }

    /// Stop servicing the transmit ring until more data is written.
    pub fn stop_tx(&self) {
        engine::stop_tx(&mut self.shared.lock());
    }

    /// Re-enable transmit servicing.
    pub fn start_tx(&self) {
        trace!("start_tx");
        self.shared.lock().tx_stopped = false;
    }

    /// Stop synthesizing received data. Transmit servicing still rides
    /// each tick.
    pub fn stop_rx(&self) {
        trace!("stop_rx");
        self.shared.lock().rx_stopped = true;
    }

    // ----- producer path -----

    /// Queue bytes for transmission. Accepts at most the ring's free space
    /// and returns how many bytes were taken; also re-enables transmit
    /// servicing when anything was queued.
    pub fn write(&self, data: &[u8]) -> Result<usize, UartError> {
        let mut st = self.shared.lock();
        if !st.open {
            return Err(UartError::NotOpen);
        }
        let accepted = st.xmit.write(data);
        if accepted > 0 {
            st.tx_stopped = false;
        }
        Ok(accepted)
    }

    /// Queue a high-priority control byte that bypasses the ring on the
    /// next drain cycle. A previously queued one is replaced.
    pub fn send_x_char(&self, byte: u8) {
        self.shared.lock().x_char = Some(byte);
    }

    /// Free space currently available to [`Port::write`].
    pub fn write_room(&self) -> usize {
        self.shared.lock().xmit.free()
    }

    /// Bytes currently queued for transmission.
    pub fn pending(&self) -> usize {
        self.shared.lock().xmit.pending()
    }

    pub fn counters(&self) -> Counters {
        self.shared.lock().icount
    }

    /// Diagnostic view of the port for host tooling.
    pub fn snapshot(&self) -> PortSnapshot {
        let st = self.shared.lock();
        PortSnapshot {
            driver: self.backend.driver_name().to_string(),
            open: st.open,
            line: st.line.clone(),
            pending: st.xmit.pending(),
            tx_stopped: st.tx_stopped,
            rx_stopped: st.rx_stopped,
            counters: st.icount,
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.shared.lock();
        f.debug_struct("Port")
            .field("driver", &self.backend.driver_name())
            .field("open", &st.open)
            .field("pending", &st.xmit.pending())
            .finish()
    }
}

/// Serializable snapshot of a port's current state.
#[derive(Debug, Clone, Serialize)]
pub struct PortSnapshot {
    pub driver: String,
    pub open: bool,
    pub line: LineConfig,
    pub pending: usize,
    pub tx_stopped: bool,
    pub rx_stopped: bool,
    pub counters: Counters,
}
