//! Timer-driven receive emulation.
//!
//! No hardware backs this driver, so "received" data is synthesized by a
//! per-port periodic timer task: once per interval it delivers one fixed
//! byte upward, flushes, re-arms, and then services the transmit ring.
//! The task holds only a weak reference to the port's shared state, so a
//! late fire can never touch a dropped port.

use crate::engine;
use crate::port::traits::{Backend, RxStatus};
use crate::port::{PortShared, SinkSlot};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Interval between synthesized receive events.
pub const DEFAULT_TICK: Duration = Duration::from_secs(2);

/// The byte value every synthesized receive event carries.
pub const EMULATED_CHAR: u8 = b't';

/// The armed state of a per-port receive timer: one outstanding task plus
/// its cancellation channel.
pub(crate) struct ReceiveEmulator {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReceiveEmulator {
    /// Spawn the timer task, with the first fire one full interval from now.
    pub(crate) fn arm(
        handle: &Handle,
        shared: Weak<Mutex<PortShared>>,
        sink: SinkSlot,
        backend: Arc<dyn Backend>,
        interval: Duration,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let task = handle.spawn(run(shared, sink, backend, interval, stop_rx));
        Self { stop, task }
    }

    /// Cancel the timer and wait for the task to finish. No fire executes
    /// after this returns.
    pub(crate) async fn cancel(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

async fn run(
    shared: Weak<Mutex<PortShared>>,
    sink: SinkSlot,
    backend: Arc<dyn Backend>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut timer = time::interval_at(Instant::now() + interval, interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = timer.tick() => {
                // The owning port is gone; nothing left to emulate.
                let Some(shared) = shared.upgrade() else { break };
                fire(&shared, &sink, backend.as_ref());
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
}

/// One timer fire: synthesize a received byte, push it upward, then service
/// the transmit side.
fn fire(shared: &Mutex<PortShared>, sink: &SinkSlot, backend: &dyn Backend) {
    trace!("timer fire");

    // The port may be mid-teardown: a detached sink or a closed port makes
    // this cycle a silent skip, never an error.
    let Some(sink) = sink.lock().clone() else { return };

    let deliver = {
        let mut st = shared.lock();
        if !st.open {
            return;
        }
        if st.rx_stopped {
            false
        } else {
            st.icount.rx += 1;
            true
        }
    };

    if deliver {
        sink.push_char(EMULATED_CHAR, RxStatus::Normal);
        sink.flush();
    }

    // There is no independent transmit-complete interrupt in the emulation,
    // so transmit servicing rides the same tick as the receive event.
    let mut st = shared.lock();
    if st.open {
        engine::drain(&mut st, backend, sink.as_ref());
    }
}
