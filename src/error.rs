use crate::serial::SerialNumber;
use std::fmt::Display;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// A characteristic value or advertisement could not be decoded.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("wrong length {length}, expected {expected_length}")]
    WrongLength {
        length: usize,
        expected_length: usize,
    },
    #[error("too short ({length} bytes), expected at least {minimum_length}")]
    TooShort {
        length: usize,
        minimum_length: usize,
    },
    #[error("raw value {raw} at offset {offset} out of range")]
    OutOfRange { offset: usize, raw: i32 },
    #[error("incompatible current values version (expected {expected}, got {actual})")]
    UnsupportedVersion { expected: u8, actual: u8 },
    #[error(
        "invalid timestamp {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
    )]
    InvalidDatetime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no Bluetooth adapter found")]
    NoAdapter,
    #[error("could not find device with serial number {0}")]
    DeviceNotFound(SerialNumber),
    #[error("characteristic {0} not found on device")]
    CharacteristicNotFound(Uuid),
    #[error(transparent)]
    Bluetooth(#[from] btleplug::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) const fn check_length(length: usize, expected_length: usize) -> Result<(), DecodeError> {
    if length == expected_length {
        Ok(())
    } else {
        Err(DecodeError::WrongLength {
            length,
            expected_length,
        })
    }
}

/// Combine the outcome of an operation with the outcome of the cleanup that followed it. An error
/// of the operation is returned even if the cleanup failed too; the cleanup error is only logged.
pub(crate) fn with_cleanup<T, E: Into<Error> + Display>(
    outcome: Result<T>,
    cleanup: Result<(), E>,
) -> Result<T> {
    match (outcome, cleanup) {
        (outcome, Ok(())) => outcome,
        (Err(e), Err(cleanup)) => {
            warn!(error = %cleanup, "cleanup failed");
            Err(e)
        }
        (Ok(_), Err(cleanup)) => Err(cleanup.into()),
    }
}
