//! Fixed-offset binary layouts of characteristic values.
//!
//! Every value read from a Wave is a packed little-endian record. A [`Field`] describes where one
//! raw integer lives in such a record and how it converts to a physical quantity.

use crate::error::{check_length, DecodeError};
use bytes::Buf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    U8,
    U16,
    I16,
}

impl Width {
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
        }
    }

    fn read(self, reader: &mut impl Buf) -> i32 {
        match self {
            Self::U8 => i32::from(reader.get_u8()),
            Self::U16 => i32::from(reader.get_u16_le()),
            Self::I16 => i32::from(reader.get_i16_le()),
        }
    }
}

/// One raw integer inside a record: physical value is `raw / divisor`, in `unit`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub offset: usize,
    pub width: Width,
    pub divisor: f64,
    pub unit: &'static str,
}

impl Field {
    pub const fn new(offset: usize, width: Width, divisor: f64, unit: &'static str) -> Self {
        Self {
            offset,
            width,
            divisor,
            unit,
        }
    }

    const fn end(&self) -> usize {
        self.offset + self.width.size()
    }

    /// The raw integer stored in `record`.
    pub fn raw(&self, record: &[u8]) -> Result<i32, DecodeError> {
        if record.len() < self.end() {
            return Err(DecodeError::TooShort {
                length: record.len(),
                minimum_length: self.end(),
            });
        }
        let mut reader = &record[self.offset..];
        Ok(self.width.read(&mut reader))
    }

    /// The raw integer stored in `record`, scaled to the physical unit.
    pub fn decode(&self, record: &[u8]) -> Result<f64, DecodeError> {
        Ok(self.scale(self.raw(record)?))
    }

    pub fn scale(&self, raw: i32) -> f64 {
        f64::from(raw) / self.divisor
    }

    /// A raw integer of this field as a narrower integer type.
    pub fn narrow<T: TryFrom<i32>>(&self, raw: i32) -> Result<T, DecodeError> {
        T::try_from(raw).map_err(|_| DecodeError::OutOfRange {
            offset: self.offset,
            raw,
        })
    }
}

/// A record of a fixed total length holding `N` fields, in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout<const N: usize> {
    pub length: usize,
    pub fields: [Field; N],
}

impl<const N: usize> Layout<N> {
    /// Panics if a field extends past `length`, which fails the build for layout constants.
    pub const fn new(length: usize, fields: [Field; N]) -> Self {
        let mut i = 0;
        while i < N {
            assert!(fields[i].end() <= length, "field extends past the end of the layout");
            i += 1;
        }
        Self { length, fields }
    }

    /// Check that `record` has exactly the length of this layout.
    pub fn check<'a>(&self, record: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        check_length(record.len(), self.length)?;
        Ok(record)
    }

    /// The raw integers of all fields, in layout order.
    pub fn raw(&self, record: &[u8]) -> Result<[i32; N], DecodeError> {
        let record = self.check(record)?;
        let mut raw = [0; N];
        for (value, field) in raw.iter_mut().zip(&self.fields) {
            *value = field.raw(record)?;
        }
        Ok(raw)
    }

    /// The physical values of all fields, in layout order.
    pub fn decode(&self, record: &[u8]) -> Result<[f64; N], DecodeError> {
        let raw = self.raw(record)?;
        let mut values = [0.0; N];
        for ((value, raw), field) in values.iter_mut().zip(raw).zip(&self.fields) {
            *value = field.scale(raw);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUMIDITY: Field = Field::new(1, Width::U8, 2.0, "%rH");
    const TEMPERATURE: Field = Field::new(2, Width::I16, 100.0, "degC");
    const RADON: Field = Field::new(4, Width::U16, 1.0, "Bq/m3");

    // (field, record, raw, physical)
    const CASES: &[(Field, &[u8], i32, f64)] = &[
        (HUMIDITY, &[0, 40, 0, 0, 0, 0], 40, 20.0),
        (HUMIDITY, &[0, 255, 0, 0, 0, 0], 255, 127.5),
        (TEMPERATURE, &[0, 0, 0x66, 0x08, 0, 0], 2150, 21.5),
        (TEMPERATURE, &[0, 0, 0x6a, 0xff, 0, 0], -150, -1.5),
        (RADON, &[0, 0, 0, 0, 0x64, 0x00], 100, 100.0),
        (RADON, &[0, 0, 0, 0, 0xff, 0xff], 65535, 65535.0),
    ];

    #[test]
    fn decode_fields() {
        for &(field, record, raw, physical) in CASES {
            assert_eq!(field.raw(record), Ok(raw), "{field:?}");
            assert_eq!(field.decode(record), Ok(physical), "{field:?}");
        }
    }

    #[test]
    fn decode_field_past_end() {
        assert_eq!(
            RADON.decode(&[0, 0, 0, 0, 0x64]),
            Err(DecodeError::TooShort {
                length: 5,
                minimum_length: 6
            })
        );
    }

    #[test]
    fn narrow_raw() {
        assert_eq!(RADON.narrow::<u16>(65535), Ok(65535));
        assert_eq!(
            RADON.narrow::<u16>(-1),
            Err(DecodeError::OutOfRange { offset: 4, raw: -1 })
        );
        assert_eq!(
            HUMIDITY.narrow::<u8>(256),
            Err(DecodeError::OutOfRange { offset: 1, raw: 256 })
        );
    }

    #[test]
    fn layout_length() {
        let layout = Layout::new(2, []);
        assert_eq!(layout.check(&[1, 2]), Ok(&[1u8, 2][..]));
        assert_eq!(
            layout.check(&[1]),
            Err(DecodeError::WrongLength {
                length: 1,
                expected_length: 2
            })
        );
        assert_eq!(
            layout.check(&[1, 2, 3]),
            Err(DecodeError::WrongLength {
                length: 3,
                expected_length: 2
            })
        );
    }

    #[test]
    fn layout_decodes_fields_in_order() {
        let layout = Layout::new(6, [RADON, HUMIDITY, TEMPERATURE]);
        let record = [0, 40, 0x6a, 0xff, 0x64, 0x00];
        assert_eq!(layout.raw(&record), Ok([100, 40, -150]));
        assert_eq!(layout.decode(&record), Ok([100.0, 20.0, -1.5]));
    }

    #[test]
    fn layout_rejects_wrong_length_before_fields() {
        let layout = Layout::new(6, [HUMIDITY, RADON]);
        assert_eq!(
            layout.decode(&[0, 40, 0, 0, 0x64]),
            Err(DecodeError::WrongLength {
                length: 5,
                expected_length: 6
            })
        );
    }

    #[test]
    #[should_panic(expected = "field extends past the end of the layout")]
    fn layout_field_past_end() {
        let _ = Layout::new(5, [RADON]);
    }
}
