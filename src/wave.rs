//! First generation Wave: every sensor value lives in its own characteristic.

use crate::characteristics;
use crate::discovery::{discover, ScanBudget};
use crate::error::{with_cleanup, DecodeError, Error, Result};
use crate::layout::{Field, Layout, Width};
use crate::serial::SerialNumber;
use btleplug::api::{Central, Characteristic, Peripheral};
use bytes::Buf;
use std::fmt::{self, Display, Formatter};
use time::macros::format_description;
use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::{debug, info};
use uuid::Uuid;

// u16 year, then u8 month, day, hour, minute and second.
const DATETIME: Layout<0> = Layout::new(7, []);

const HUMIDITY: Layout<1> = Layout::new(2, [Field::new(0, Width::U16, 100.0, "%rH")]);
const TEMPERATURE: Layout<1> = Layout::new(2, [Field::new(0, Width::I16, 100.0, "degC")]);
const RADON_ST_AVG: Layout<1> = Layout::new(2, [Field::new(0, Width::U16, 1.0, "Bq/m3")]);
const RADON_LT_AVG: Layout<1> = Layout::new(2, [Field::new(0, Width::U16, 1.0, "Bq/m3")]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sensor {
    Datetime,
    Humidity,
    Temperature,
    RadonShortTermAvg,
    RadonLongTermAvg,
}

impl Sensor {
    /// All sensors, in table column order.
    pub const ALL: [Self; 5] = [
        Self::Datetime,
        Self::Humidity,
        Self::Temperature,
        Self::RadonShortTermAvg,
        Self::RadonLongTermAvg,
    ];

    pub const fn uuid(self) -> Uuid {
        match self {
            Self::Datetime => characteristics::DATETIME,
            Self::Humidity => characteristics::HUMIDITY,
            Self::Temperature => characteristics::TEMPERATURE,
            Self::RadonShortTermAvg => characteristics::RADON_ST_AVG,
            Self::RadonLongTermAvg => characteristics::RADON_LT_AVG,
        }
    }

    /// Column header.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Datetime => "Datetime",
            Self::Humidity => "Humidity",
            Self::Temperature => "Temperature",
            Self::RadonShortTermAvg => "Radon ST avg",
            Self::RadonLongTermAvg => "Radon LT avg",
        }
    }

    const fn layout(self) -> Option<Layout<1>> {
        match self {
            Self::Datetime => None,
            Self::Humidity => Some(HUMIDITY),
            Self::Temperature => Some(TEMPERATURE),
            Self::RadonShortTermAvg => Some(RADON_ST_AVG),
            Self::RadonLongTermAvg => Some(RADON_LT_AVG),
        }
    }

    /// Decode the raw value of this sensor's characteristic.
    pub fn decode(self, value: &[u8]) -> Result<Reading, DecodeError> {
        match self.layout() {
            None => decode_datetime(value).map(Reading::Datetime),
            Some(layout) => {
                let [value] = layout.decode(value)?;
                Ok(Reading::Measurement {
                    value,
                    unit: layout.fields[0].unit,
                })
            }
        }
    }
}

/// One decoded sensor value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Datetime(PrimitiveDateTime),
    Measurement { value: f64, unit: &'static str },
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Datetime(datetime) => {
                let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
                let formatted = datetime.format(format).map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            }
            // Debug keeps the fractional part of whole numbers: `45.0`, not `45`.
            Self::Measurement { value, unit } => write!(f, "{value:?} {unit}"),
        }
    }
}

fn decode_datetime(value: &[u8]) -> Result<PrimitiveDateTime, DecodeError> {
    let mut reader = DATETIME.check(value)?;
    let year = reader.get_u16_le();
    let [month, day, hour, minute, second] = [(); 5].map(|()| reader.get_u8());

    let invalid = DecodeError::InvalidDatetime {
        year,
        month,
        day,
        hour,
        minute,
        second,
    };
    let date = Month::try_from(month)
        .and_then(|month| Date::from_calendar_date(i32::from(year), month, day))
        .map_err(|_| invalid.clone())?;
    let time = Time::from_hms(hour, minute, second).map_err(|_| invalid)?;
    Ok(PrimitiveDateTime::new(date, time))
}

/// A Wave that is not connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wave {
    pub serial_number: SerialNumber,
}

impl Wave {
    pub const fn new(serial_number: SerialNumber) -> Self {
        Self { serial_number }
    }

    /// Find the device by its advertised serial number, connect, and look up the characteristics
    /// of all sensors.
    pub async fn connect<C: Central>(
        &self,
        central: &C,
        budget: ScanBudget,
    ) -> Result<ConnectedWave<C::Peripheral>> {
        let peripheral = discover(central, self.serial_number, budget)
            .await?
            .ok_or(Error::DeviceNotFound(self.serial_number))?;

        peripheral.connect().await?;
        info!(address = %peripheral.address(), "connected");
        let characteristics = match lookup_characteristics(&peripheral).await {
            Ok(characteristics) => characteristics,
            Err(e) => return with_cleanup(Err(e), peripheral.disconnect().await),
        };

        Ok(ConnectedWave {
            serial_number: self.serial_number,
            peripheral,
            characteristics,
        })
    }
}

async fn lookup_characteristics(peripheral: &impl Peripheral) -> Result<Vec<Characteristic>> {
    peripheral.discover_services().await?;
    Sensor::ALL
        .iter()
        .map(|sensor| characteristics::find(peripheral, sensor.uuid()))
        .collect()
}

/// A Wave with an open connection and all sensor characteristics resolved.
#[derive(Debug)]
pub struct ConnectedWave<P> {
    serial_number: SerialNumber,
    peripheral: P,
    // indexed in `Sensor::ALL` order
    characteristics: Vec<Characteristic>,
}

impl<P: Peripheral> ConnectedWave<P> {
    pub const fn serial_number(&self) -> SerialNumber {
        self.serial_number
    }

    pub async fn read(&self, sensor: Sensor) -> Result<Reading> {
        let characteristic = &self.characteristics[sensor as usize];
        let value = self.peripheral.read(characteristic).await?;
        debug!(?sensor, ?value, "read characteristic");
        Ok(sensor.decode(&value)?)
    }

    /// Read every sensor, in `Sensor::ALL` order.
    pub async fn read_all(&self) -> Result<Vec<Reading>> {
        let mut readings = Vec::with_capacity(Sensor::ALL.len());
        for sensor in Sensor::ALL {
            readings.push(self.read(sensor).await?);
        }
        Ok(readings)
    }

    pub async fn disconnect(self) -> Result<Wave> {
        self.peripheral.disconnect().await?;
        info!("disconnected");
        Ok(Wave::new(self.serial_number))
    }
}
