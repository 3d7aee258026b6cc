use crate::error::{with_cleanup, Result};
use crate::serial::{advertises_serial_number, SerialNumber};
use btleplug::api::{Central, Peripheral, ScanFilter};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info};

/// How long to look for a device: `rounds` checks of the advertisements seen so far, `interval`
/// apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanBudget {
    pub interval: Duration,
    pub rounds: u32,
}

impl ScanBudget {
    pub const SCAN_INTERVAL: Duration = Duration::from_millis(100);

    /// 50 rounds of 100 ms.
    pub const WAVE: Self = Self {
        interval: Self::SCAN_INTERVAL,
        rounds: 50,
    };

    /// 3 seconds in rounds of 100 ms.
    pub const WAVE2: Self = Self::from_timeout(Duration::from_secs(3), Self::SCAN_INTERVAL);

    /// Split `timeout` into rounds of `interval`.
    pub const fn from_timeout(timeout: Duration, interval: Duration) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let rounds = (timeout.as_millis() / interval.as_millis()) as u32;
        Self { interval, rounds }
    }
}

/// Scan until a peripheral advertises `serial_number` in its manufacturer data.
///
/// Returns `Ok(None)` if the budget runs out first.
pub async fn discover<C: Central>(
    central: &C,
    serial_number: SerialNumber,
    budget: ScanBudget,
) -> Result<Option<C::Peripheral>> {
    info!(%serial_number, rounds = budget.rounds, "scanning for device");
    central.start_scan(ScanFilter::default()).await?;

    let found = find_peripheral(central, serial_number, budget).await;

    with_cleanup(found, central.stop_scan().await)
}

async fn find_peripheral<C: Central>(
    central: &C,
    serial_number: SerialNumber,
    budget: ScanBudget,
) -> Result<Option<C::Peripheral>> {
    for round in 0..budget.rounds {
        time::sleep(budget.interval).await;
        for peripheral in central.peripherals().await? {
            if let Some(properties) = peripheral.properties().await?
                && advertises_serial_number(&properties.manufacturer_data, serial_number)
            {
                info!(%serial_number, address = %peripheral.address(), round, "found device");
                return Ok(Some(peripheral));
            }
        }
        debug!(round, "device not seen yet");
    }
    Ok(None)
}
