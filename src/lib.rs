#![doc = include_str!("../Readme.md")]
#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

pub mod characteristics;
pub mod cli;
pub mod discovery;
mod error;
pub mod layout;
pub mod output;
pub mod serial;
pub mod wave;
pub mod wave2;

use btleplug::api::Manager as _;
use btleplug::platform::{Adapter, Manager};
use tracing_subscriber::EnvFilter;

pub use discovery::ScanBudget;
pub use error::{DecodeError, Error, Result};
pub use serial::{parse_serial_number, SerialNumber, AIRTHINGS_COMPANY_ID};
pub use wave::{ConnectedWave, Reading, Sensor, Wave};
pub use wave2::{ConnectedWave2, CurrentValues, Wave2};

/// Install the error report handler and a log subscriber writing to stderr, filtered by
/// `RUST_LOG` (default `warn`).
pub fn init() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// The first Bluetooth adapter of the system.
pub async fn default_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    // TODO: support choosing an adapter when there are several
    manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or(Error::NoAdapter)
}
