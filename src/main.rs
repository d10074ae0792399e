//! Demo host for the tinytty driver core.
//!
//! Opens one emulated port, queues a message for transmission, prints the
//! bytes the receive emulator synthesizes, and dumps a JSON snapshot of
//! the port on shutdown.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tinytty::{
    EmulatedBackend, LineRequest, LineSink, Parity, Port, PortOptions, RxStatus, StopBits,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Demo host for the tinytty emulated serial port driver core"
)]
struct Args {
    /// Baud rate to negotiate.
    #[arg(short, long, default_value_t = 9600)]
    baud: u32,

    /// Receive emulator tick interval in milliseconds.
    #[arg(short, long, default_value_t = 2000)]
    interval_ms: u64,

    /// How long to run before shutting the port down, in seconds.
    #[arg(short, long, default_value_t = 10)]
    run_secs: u64,

    /// Message to queue for transmission.
    #[arg(short, long, default_value = "hello from tinytty")]
    message: String,
}

/// Stands in for a terminal layer: logs every synthesized byte.
#[derive(Debug, Default)]
struct ConsoleSink;

impl LineSink for ConsoleSink {
    fn push_char(&self, byte: u8, status: RxStatus) {
        info!(?status, "received 0x{byte:02x}");
    }

    fn flush(&self) {}

    fn write_wakeup(&self) {
        info!("write wakeup: transmit ring has room again");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let port = Port::with_options(
        Arc::new(EmulatedBackend),
        PortOptions {
            tick: Duration::from_millis(args.interval_ms),
            ..PortOptions::default()
        },
    );
    port.set_sink(Arc::new(ConsoleSink));

    port.startup()?;
    port.set_line_config(&LineRequest {
        data_bits: 8,
        parity: Parity::None,
        stop_bits: StopBits::One,
        hw_flow: false,
        baud: args.baud,
    });

    let queued = port.write(args.message.as_bytes())?;
    info!(queued, "queued message for transmission");

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.run_secs)) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }

    port.shutdown().await;
    println!("{}", serde_json::to_string_pretty(&port.snapshot())?);
    Ok(())
}
