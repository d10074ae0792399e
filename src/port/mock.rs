//! Mock line-discipline sink and capturing backend for tests.
//!
//! [`MockLine`] records everything the driver pushes upward, and
//! [`CapturingBackend`] records every byte the drain path emits, so tests
//! can assert on delivery order, flush behavior, and wakeup signalling
//! without any real terminal layer.

use super::traits::{Backend, LineSink, RxStatus};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MockLineState {
    received: Vec<(u8, RxStatus)>,
    flushes: usize,
    wakeups: usize,
}

/// A line-discipline stand-in that records delivered bytes, flushes, and
/// wakeup signals.
///
/// Clones share state, so a test can hand one clone to the port and keep
/// another for assertions.
#[derive(Debug, Default, Clone)]
pub struct MockLine {
    state: Arc<Mutex<MockLineState>>,
}

impl MockLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered `(byte, status)` pairs, in delivery order.
    pub fn received(&self) -> Vec<(u8, RxStatus)> {
        self.state.lock().received.clone()
    }

    /// Just the delivered byte values, in delivery order.
    pub fn received_bytes(&self) -> Vec<u8> {
        self.state.lock().received.iter().map(|&(b, _)| b).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.state.lock().flushes
    }

    pub fn wakeup_count(&self) -> usize {
        self.state.lock().wakeups
    }
}

impl LineSink for MockLine {
    fn push_char(&self, byte: u8, status: RxStatus) {
        self.state.lock().received.push((byte, status));
    }

    fn flush(&self) {
        self.state.lock().flushes += 1;
    }

    fn write_wakeup(&self) {
        self.state.lock().wakeups += 1;
    }
}

/// Backend that captures transmitted bytes instead of logging them.
#[derive(Debug, Default, Clone)]
pub struct CapturingBackend {
    sent: Arc<Mutex<Vec<u8>>>,
}

impl CapturingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every byte emitted so far, in transmission order.
    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().clone()
    }
}

impl Backend for CapturingBackend {
    fn send_byte(&self, byte: u8) {
        self.sent.lock().push(byte);
    }
}
