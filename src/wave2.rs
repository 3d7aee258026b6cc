//! Second generation Wave: all current values are packed into a single characteristic.

use crate::characteristics;
use crate::discovery::{discover, ScanBudget};
use crate::error::{with_cleanup, DecodeError, Error, Result};
use crate::layout::{Field, Layout, Width};
use crate::serial::SerialNumber;
use btleplug::api::{Central, Characteristic, Peripheral};
use btleplug::platform::PeripheralId;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, info, warn};

pub const CURRENT_VALUES_VERSION: u8 = 1;

const HUMIDITY: Field = Field::new(1, Width::U8, 2.0, "%rH");
const RADON_STA: Field = Field::new(10, Width::U16, 1.0, "Bq/m3");
const RADON_LTA: Field = Field::new(12, Width::U16, 1.0, "Bq/m3");
const TEMPERATURE: Field = Field::new(14, Width::U16, 100.0, "*C");

// 4 u8 fields then 8 u16 fields, the version at offset 0. The u8 at offset 2 and 3 and the u16 at
// offsets 4, 6, 8, 16 and 18 are not decoded.
const CURRENT_VALUES: Layout<4> =
    Layout::new(20, [HUMIDITY, TEMPERATURE, RADON_STA, RADON_LTA]);

/// The current values reported by a Wave 2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentValues {
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Temperature in ºC.
    pub temperature: f64,
    /// Short term radon average in Bq/m³.
    pub radon_sta: u16,
    /// Long term radon average in Bq/m³.
    pub radon_lta: u16,
}

impl CurrentValues {
    /// Decode the raw value of the current values characteristic.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        let record = CURRENT_VALUES.check(value)?;

        let version = record[0];
        if version != CURRENT_VALUES_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                expected: CURRENT_VALUES_VERSION,
                actual: version,
            });
        }

        let [humidity, temperature, radon_sta, radon_lta] = CURRENT_VALUES.raw(record)?;
        Ok(Self {
            humidity: HUMIDITY.scale(humidity),
            temperature: TEMPERATURE.scale(temperature),
            radon_sta: RADON_STA.narrow(radon_sta)?,
            radon_lta: RADON_LTA.narrow(radon_lta)?,
        })
    }
}

impl Display for CurrentValues {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Humidity: {:?} {}, Temperature: {:?} {}, Radon STA: {} {}, Radon LTA: {} {}",
            self.humidity,
            HUMIDITY.unit,
            self.temperature,
            TEMPERATURE.unit,
            self.radon_sta,
            RADON_STA.unit,
            self.radon_lta,
            RADON_LTA.unit
        )
    }
}

/// A Wave 2 that is not connected.
///
/// Remembers the peripheral found by the first successful scan so that reconnecting does not need
/// to scan again.
#[derive(Clone, Debug)]
pub struct Wave2 {
    pub serial_number: SerialNumber,
    peripheral_id: Option<PeripheralId>,
}

impl Wave2 {
    pub const fn new(serial_number: SerialNumber) -> Self {
        Self {
            serial_number,
            peripheral_id: None,
        }
    }

    /// Connect, making up to `retries` attempts (at least one). The error of the last attempt is
    /// returned if they all fail.
    pub async fn connect<C: Central>(
        &mut self,
        central: &C,
        retries: u32,
        budget: ScanBudget,
    ) -> Result<ConnectedWave2<C::Peripheral>> {
        retry(retries, async || self.try_connect(central, budget).await).await
    }

    async fn try_connect<C: Central>(
        &mut self,
        central: &C,
        budget: ScanBudget,
    ) -> Result<ConnectedWave2<C::Peripheral>> {
        let peripheral = if let Some(id) = self.peripheral_id.clone() {
            central.peripheral(&id).await?
        } else {
            let peripheral = discover(central, self.serial_number, budget)
                .await?
                .ok_or(Error::DeviceNotFound(self.serial_number))?;
            self.peripheral_id = Some(peripheral.id());
            peripheral
        };

        peripheral.connect().await?;
        info!(address = %peripheral.address(), "connected");
        let characteristic = match lookup_current_values(&peripheral).await {
            Ok(characteristic) => characteristic,
            Err(e) => return with_cleanup(Err(e), peripheral.disconnect().await),
        };

        Ok(ConnectedWave2 {
            peripheral,
            characteristic,
        })
    }
}

/// Run `attempt` until it succeeds, at most `retries` times and at least once, without delay in
/// between. Returns the error of the last attempt if none succeeds.
async fn retry<T, E: Display>(
    retries: u32,
    mut attempt: impl AsyncFnMut() -> Result<T, E>,
) -> Result<T, E> {
    let retries = retries.max(1);
    let mut tries = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if tries < retries => {
                warn!(attempt = tries, retries, error = %e, "connection attempt failed");
                tries += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn lookup_current_values(peripheral: &impl Peripheral) -> Result<Characteristic> {
    peripheral.discover_services().await?;
    characteristics::find(peripheral, characteristics::CURRENT_VALUES)
}

/// A Wave 2 with an open connection.
#[derive(Debug)]
pub struct ConnectedWave2<P> {
    peripheral: P,
    characteristic: Characteristic,
}

impl<P: Peripheral> ConnectedWave2<P> {
    pub async fn read(&self) -> Result<CurrentValues> {
        let value = self.peripheral.read(&self.characteristic).await?;
        debug!(?value, "read current values");
        Ok(CurrentValues::decode(&value)?)
    }

    pub async fn disconnect(self) -> Result<()> {
        self.peripheral.disconnect().await?;
        info!("disconnected");
        Ok(())
    }
}
