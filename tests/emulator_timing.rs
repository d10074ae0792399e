//! Timing behavior of the receive emulator.
//!
//! All tests run on a paused tokio clock: virtual time auto-advances to
//! the next armed timer whenever the runtime goes idle, so a "2 second"
//! tick interval costs nothing and the schedules are fully deterministic.

use std::sync::Arc;
use std::time::Duration;
use tinytty::{
    CapturingBackend, MockLine, Port, PortOptions, RxStatus, UartError, EMULATED_CHAR,
};

fn emulated_port() -> (Port, MockLine, CapturingBackend) {
    let backend = CapturingBackend::new();
    let port = Port::new(Arc::new(backend.clone()));
    let line = MockLine::new();
    port.set_sink(Arc::new(line.clone()));
    (port, line, backend)
}

#[tokio::test(start_paused = true)]
async fn delivers_one_clean_byte_per_tick() {
    let (port, line, _backend) = emulated_port();
    port.startup().unwrap();

    // Default 2 s interval: fires at t=2,4,6.
    tokio::time::sleep(Duration::from_secs(7)).await;

    assert_eq!(
        line.received(),
        vec![
            (EMULATED_CHAR, RxStatus::Normal),
            (EMULATED_CHAR, RxStatus::Normal),
            (EMULATED_CHAR, RxStatus::Normal),
        ]
    );
    assert_eq!(line.flush_count(), 3);
    assert_eq!(port.counters().rx, 3);

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn first_fire_waits_one_full_interval() {
    let (port, line, _backend) = emulated_port();
    port.startup().unwrap();

    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert!(line.received().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(line.received_bytes(), vec![EMULATED_CHAR]);

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn tick_services_the_transmit_ring() {
    let (port, line, backend) = emulated_port();
    port.startup().unwrap();

    assert_eq!(port.write(b"hi").unwrap(), 2);
    tokio::time::sleep(Duration::from_secs(3)).await;

    // One tick: one synthesized byte up, both queued bytes drained.
    assert_eq!(line.received_bytes(), vec![EMULATED_CHAR]);
    assert_eq!(backend.sent(), b"hi");
    let snap = port.snapshot();
    assert_eq!(snap.counters.tx, 2);
    assert_eq!(snap.pending, 0);
    assert!(snap.tx_stopped);

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn x_char_preempts_ring_data_for_one_tick() {
    let (port, _line, backend) = emulated_port();
    port.startup().unwrap();

    port.write(b"data").unwrap();
    port.send_x_char(0x11);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(backend.sent(), vec![0x11]);
    assert_eq!(port.pending(), 4);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.sent(), vec![0x11, b'd', b'a', b't', b'a']);

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn no_delivery_after_shutdown_returns() {
    let (port, line, _backend) = emulated_port();
    port.startup().unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    port.shutdown().await;
    let seen = line.received_bytes().len();
    assert_eq!(seen, 2);

    // A generous post-shutdown window: nothing more may arrive.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(line.received_bytes().len(), seen);
    assert_eq!(port.counters().rx, seen as u64);
}

#[tokio::test(start_paused = true)]
async fn shutdown_clears_the_transmit_backlog() {
    let (port, _line, _backend) = emulated_port();
    port.startup().unwrap();
    port.write(b"never sent").unwrap();

    port.shutdown().await;

    let snap = port.snapshot();
    assert!(!snap.open);
    assert_eq!(snap.pending, 0);
    assert!(snap.tx_stopped);
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_idempotent() {
    let (port, _line, _backend) = emulated_port();
    port.startup().unwrap();
    port.shutdown().await;
    port.shutdown().await;

    // And a never-started port shuts down safely too.
    let other = Port::new(Arc::new(CapturingBackend::new()));
    other.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn second_startup_without_shutdown_is_rejected() {
    let (port, _line, _backend) = emulated_port();
    port.startup().unwrap();
    assert!(matches!(port.startup(), Err(UartError::AlreadyStarted)));
    port.shutdown().await;

    // After a clean shutdown the port can start again.
    port.startup().unwrap();
    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn detached_sink_skips_cycles_silently() {
    let backend = CapturingBackend::new();
    let port = Port::new(Arc::new(backend.clone()));
    port.startup().unwrap();

    // No sink attached: ticks pass without delivery or counting.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(port.counters().rx, 0);

    // Attaching a sink resumes delivery on the next tick.
    let line = MockLine::new();
    port.set_sink(Arc::new(line.clone()));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(line.received_bytes(), vec![EMULATED_CHAR]);

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stop_rx_halts_synthesis_but_drain_still_runs() {
    let (port, line, backend) = emulated_port();
    port.startup().unwrap();
    port.stop_rx();
    port.write(b"tx only").unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(line.received().is_empty());
    assert_eq!(port.counters().rx, 0);
    assert_eq!(backend.sent(), b"tx only");

    port.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn custom_tick_interval_is_honored() {
    let backend = CapturingBackend::new();
    let port = Port::with_options(
        Arc::new(backend),
        PortOptions {
            tick: Duration::from_millis(100),
            ..PortOptions::default()
        },
    );
    let line = MockLine::new();
    port.set_sink(Arc::new(line.clone()));
    port.startup().unwrap();

    tokio::time::sleep(Duration::from_millis(1050)).await;
    assert_eq!(line.received_bytes().len(), 10);

    port.shutdown().await;
}
