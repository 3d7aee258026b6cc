use crate::error::{Error, Result};
use btleplug::api::{bleuuid::uuid_from_u16, Characteristic, Peripheral};
use uuid::{uuid, Uuid};

// Standard GATT characteristics exposed by the first generation Wave.
pub const DATETIME: Uuid = uuid_from_u16(0x2A08);
pub const HUMIDITY: Uuid = uuid_from_u16(0x2A6F);
pub const TEMPERATURE: Uuid = uuid_from_u16(0x2A6E);

// Airthings vendor characteristics.
pub const RADON_ST_AVG: Uuid = uuid!("b42e01aa-ade7-11e4-89d3-123b93f75cba");
pub const RADON_LT_AVG: Uuid = uuid!("b42e0a4c-ade7-11e4-89d3-123b93f75cba");
pub const CURRENT_VALUES: Uuid = uuid!("b42e4dcc-ade7-11e4-89d3-123b93f75cba");

/// Look up a discovered characteristic of a connected peripheral by UUID.
pub fn find(peripheral: &impl Peripheral, uuid: Uuid) -> Result<Characteristic> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|characteristic| characteristic.uuid == uuid)
        .ok_or(Error::CharacteristicNotFound(uuid))
}
