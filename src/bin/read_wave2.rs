#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use btleplug::api::Central;
use clap::Parser;
use color_eyre::eyre::Result;
use std::future::Future;
use std::pin::Pin;
use tokio::time;
use tracing::{error, info};
use wave_reader::cli::Wave2Config;
use wave_reader::{default_adapter, ScanBudget, Wave2};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    wave_reader::init()?;

    let config = Wave2Config::parse();
    info!(?config, "starting");

    let central = default_adapter().await?;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    poll(&central, &config, shutdown).await
}

/// Connect, read, print and disconnect once per sample period, until `shutdown` completes.
async fn poll<C: Central>(
    central: &C,
    config: &Wave2Config,
    mut shutdown: Pin<&mut impl Future>,
) -> Result<()> {
    let mut wave2 = Wave2::new(config.serial_number);

    loop {
        let connected = tokio::select! {
            connected = wave2.connect(central, config.retries, ScanBudget::WAVE2) => connected?,
            _ = &mut shutdown => {
                info!("interrupted");
                return Ok(());
            }
        };

        let values = tokio::select! {
            values = connected.read() => Some(values),
            _ = &mut shutdown => None,
        };
        if let Err(e) = connected.disconnect().await {
            error!(error = %e, "failed to disconnect");
        }
        match values {
            Some(values) => println!("{}", values?),
            None => {
                info!("interrupted");
                return Ok(());
            }
        }

        tokio::select! {
            () = time::sleep(config.sample_period()) => {}
            _ = &mut shutdown => {
                info!("interrupted");
                return Ok(());
            }
        }
    }
}
