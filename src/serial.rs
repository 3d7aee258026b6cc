//! Serial numbers broadcast in Airthings advertisements.

use crate::error::DecodeError;
use bytes::Buf;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Bluetooth SIG company identifier assigned to Airthings.
pub const AIRTHINGS_COMPANY_ID: u16 = 0x0334;

const COMPANY_ID_LENGTH: usize = 2;
// company id (u16) followed by the serial number (u32)
const MINIMUM_LENGTH: usize = 6;

/// The serial number printed under the backplate of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialNumber(pub u32);

impl Display for SerialNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SerialNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u32> for SerialNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Extract the serial number from the raw manufacturer specific data of an advertisement.
///
/// `None` stands for an advertisement without manufacturer data. Returns `Ok(None)` if there is
/// no manufacturer data or it belongs to another vendor. Data too short to hold a company
/// identifier, or an Airthings identifier without a full serial number, is an error.
pub fn parse_serial_number(
    manufacturer_data: Option<&[u8]>,
) -> Result<Option<SerialNumber>, DecodeError> {
    let Some(data) = manufacturer_data else {
        return Ok(None);
    };
    check_minimum_length(data, COMPANY_ID_LENGTH)?;

    let mut reader = data;
    if reader.get_u16_le() != AIRTHINGS_COMPANY_ID {
        return Ok(None);
    }
    check_minimum_length(data, MINIMUM_LENGTH)?;
    Ok(Some(SerialNumber(reader.get_u32_le())))
}

const fn check_minimum_length(data: &[u8], minimum_length: usize) -> Result<(), DecodeError> {
    if data.len() < minimum_length {
        return Err(DecodeError::TooShort {
            length: data.len(),
            minimum_length,
        });
    }
    Ok(())
}

/// Check whether any manufacturer data entry of an advertisement carries `serial_number`.
///
/// btleplug strips the company identifier off the payload and uses it as the map key, so the raw
/// field is put back together before parsing. Malformed entries never match.
pub fn advertises_serial_number(
    manufacturer_data: &HashMap<u16, Vec<u8>>,
    serial_number: SerialNumber,
) -> bool {
    manufacturer_data.iter().any(|(company_id, payload)| {
        let mut raw = Vec::with_capacity(2 + payload.len());
        raw.extend_from_slice(&company_id.to_le_bytes());
        raw.extend_from_slice(payload);
        match parse_serial_number(Some(raw.as_slice())) {
            Ok(found) => found == Some(serial_number),
            Err(e) => {
                tracing::trace!(company_id, error = %e, "ignoring manufacturer data");
                false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absent() {
        assert_eq!(parse_serial_number(None), Ok(None));
    }

    #[test]
    fn parse_valid() {
        assert_eq!(
            parse_serial_number(Some(&[0x34, 0x03, 0x78, 0x56, 0x34, 0x12][..])),
            Ok(Some(SerialNumber(0x1234_5678)))
        );
    }

    #[test]
    fn parse_ignores_trailing_bytes() {
        assert_eq!(
            parse_serial_number(Some(&[0x34, 0x03, 0x78, 0x56, 0x34, 0x12, 0x09, 0x00][..])),
            Ok(Some(SerialNumber(0x1234_5678)))
        );
    }

    #[test]
    fn parse_other_vendor() {
        for company_id in [0x0000, 0x0499, 0x3403, 0x0335, 0xffff] {
            let mut data = u16::to_le_bytes(company_id).to_vec();
            data.extend_from_slice(&[0x78, 0x56, 0x34, 0x12]);
            assert_eq!(parse_serial_number(Some(data.as_slice())), Ok(None), "{company_id:#06x}");
        }
    }

    #[test]
    fn parse_short_other_vendor() {
        assert_eq!(parse_serial_number(Some(&[0x99, 0x04][..])), Ok(None));
        assert_eq!(parse_serial_number(Some(&[0x99, 0x04, 0x05, 0x12][..])), Ok(None));
    }

    #[test]
    fn parse_too_short() {
        assert_eq!(
            parse_serial_number(Some(&[0x34, 0x03, 0x78][..])),
            Err(DecodeError::TooShort {
                length: 3,
                minimum_length: 6
            })
        );
        assert_eq!(
            parse_serial_number(Some(&[0x34][..])),
            Err(DecodeError::TooShort {
                length: 1,
                minimum_length: 2
            })
        );
        assert_eq!(
            parse_serial_number(Some(&[][..])),
            Err(DecodeError::TooShort {
                length: 0,
                minimum_length: 2
            })
        );
    }

    #[test]
    fn advertisement_matches_serial() {
        let data = HashMap::from([
            (0x0499, vec![0x05, 0x12]),
            (AIRTHINGS_COMPANY_ID, vec![0x78, 0x56, 0x34, 0x12, 0x09, 0x00]),
        ]);
        assert!(advertises_serial_number(&data, SerialNumber(0x1234_5678)));
        assert!(!advertises_serial_number(&data, SerialNumber(2_900_012_345)));
    }

    #[test]
    fn advertisement_without_airthings_data() {
        assert!(!advertises_serial_number(&HashMap::new(), SerialNumber(1)));
        let data = HashMap::from([(AIRTHINGS_COMPANY_ID, vec![0x01, 0x00])]);
        assert!(!advertises_serial_number(&data, SerialNumber(1)));
    }

    #[test]
    fn serial_number_from_str() {
        assert_eq!("2900012345".parse::<SerialNumber>(), Ok(SerialNumber(2_900_012_345)));
        assert!("29000123456".parse::<SerialNumber>().is_err());
        assert_eq!(SerialNumber(2_900_012_345).to_string(), "2900012345");
    }
}
