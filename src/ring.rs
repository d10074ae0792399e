//! Fixed-capacity transmit ring buffer.
//!
//! The producer (write path) advances `head`, the consumer (drain path)
//! advances `tail`, both wrapping modulo a power-of-two capacity. One slot
//! is kept free so that `head == tail` always means empty; the usable
//! capacity is therefore `capacity - 1`.

/// Default transmit buffer capacity in bytes.
pub const XMIT_SIZE: usize = 4096;

/// Circular byte buffer holding data queued for transmission.
#[derive(Debug)]
pub struct TxRing {
    buf: Box<[u8]>,
    head: usize,
    tail: usize,
}

impl TxRing {
    pub fn new() -> Self {
        Self::with_capacity(XMIT_SIZE)
    }

    /// Create a ring with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two or is less than 2.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two() && capacity >= 2,
            "ring capacity must be a power of two >= 2"
        );
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
        }
    }

    fn mask(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently queued for transmission.
    pub fn pending(&self) -> usize {
        self.head.wrapping_sub(self.tail) & self.mask()
    }

    /// Free space available to the producer.
    pub fn free(&self) -> usize {
        self.capacity() - 1 - self.pending()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Enqueue a single byte. Returns `false` when the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.free() == 0 {
            return false;
        }
        let head = self.head;
        self.buf[head] = byte;
        self.head = (head + 1) & self.mask();
        true
    }

    /// Enqueue as much of `data` as fits, returning the number of bytes
    /// accepted.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let mut accepted = 0;
        for &byte in data {
            if !self.push(byte) {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Dequeue the byte at the tail, advancing the consumer cursor.
    pub fn take(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) & self.mask();
        Some(byte)
    }

    /// Logically discard all queued bytes. The backing storage is untouched.
    pub fn clear(&mut self) {
        self.tail = self.head;
    }
}

impl Default for TxRing {
    fn default() -> Self {
        Self::new()
    }
}
