#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use btleplug::api::Peripheral;
use clap::Parser;
use color_eyre::eyre::Result;
use std::process::exit;
use tokio::time;
use tracing::{error, info};
use wave_reader::cli::{UsageError, WaveArgs, WaveConfig, WAVE_USAGE};
use wave_reader::output::{OutputMode, Table};
use wave_reader::{default_adapter, ConnectedWave, Error, ScanBudget, Sensor, Wave};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    wave_reader::init()?;

    let config = match WaveArgs::try_parse() {
        Ok(args) => args.validate(),
        Err(e) => match UsageError::from_clap(&e) {
            Some(usage) => Err(usage),
            None => e.exit(),
        },
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("{e}");
            println!("{WAVE_USAGE}");
            exit(1);
        }
    };
    info!(?config, "starting");

    let central = default_adapter().await?;
    let wave = match Wave::new(config.serial_number)
        .connect(&central, ScanBudget::WAVE)
        .await
    {
        Ok(wave) => wave,
        Err(Error::DeviceNotFound(_)) => {
            println!("ERROR: Could not find device.");
            println!(
                "GUIDE: (1) Please verify the serial number. (2) Ensure that the device is advertising. (3) Retry connection."
            );
            exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = tokio::select! {
        result = poll(&wave, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    if let Err(e) = wave.disconnect().await {
        error!(error = %e, "failed to disconnect");
    }
    outcome
}

async fn poll<P: Peripheral>(wave: &ConnectedWave<P>, config: &WaveConfig) -> Result<()> {
    let table = Table::new(config.mode);

    if config.mode == OutputMode::Terminal {
        println!("\nPress ctrl-C to exit program\n");
    }
    println!("Device serial number: {}", wave.serial_number());
    println!("{}", table.header(&Sensor::ALL.map(Sensor::name)));

    loop {
        let readings = wave.read_all().await?;
        println!("{}", table.row(&readings));
        time::sleep(config.sample_period).await;
    }
}
