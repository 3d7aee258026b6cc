//! Command line configuration of the two readers.

use crate::output::OutputMode;
use crate::serial::SerialNumber;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;

pub const WAVE_USAGE: &str = "\
USAGE: read_wave SN SAMPLE-PERIOD [pipe > yourfile.txt]
    where SN is the 10-digit serial number found under the magnetic backplate of your Wave.
    where SAMPLE-PERIOD is the time in seconds between reading the current values.
    where [pipe > yourfile.txt] is optional and specifies that you want to pipe your results to yourfile.txt.";

/// Arguments of `read_wave`, as given.
///
/// Validated separately by [`WaveArgs::validate`] so that every problem is reported with the same
/// usage text.
#[derive(Parser, Debug)]
#[command(name = "read_wave", about = "Read current values from a Wave", version)]
pub struct WaveArgs {
    /// 10-digit serial number found under the magnetic backplate.
    #[arg(value_name = "SN", allow_hyphen_values = true)]
    pub serial_number: Option<String>,
    /// Time in seconds between reading the current values.
    #[arg(value_name = "SAMPLE-PERIOD", allow_hyphen_values = true)]
    pub sample_period: Option<String>,
    /// `terminal` (default) or `pipe`.
    #[arg(value_name = "MODE", allow_hyphen_values = true)]
    pub mode: Option<String>,
    /// Anything after the mode is ignored.
    #[arg(hide = true, allow_hyphen_values = true)]
    pub ignored: Vec<String>,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("ERROR: Missing input argument SN or SAMPLE-PERIOD.")]
    MissingArgument,
    #[error("ERROR: Invalid SN format.")]
    SerialNumber,
    #[error("ERROR: Invalid SAMPLE-PERIOD. Must be a numerical value larger than zero.")]
    SamplePeriod,
    #[error("ERROR: Invalid piping method.")]
    Mode,
    #[error("ERROR: Invalid arguments.")]
    Unrecognized,
}

impl UsageError {
    /// The usage error for arguments rejected while parsing. `None` for help and version
    /// requests, which clap prints itself.
    pub fn from_clap(error: &clap::Error) -> Option<Self> {
        match error.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => None,
            _ => Some(Self::Unrecognized),
        }
    }
}

/// Validated configuration of `read_wave`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveConfig {
    pub serial_number: SerialNumber,
    pub sample_period: Duration,
    pub mode: OutputMode,
}

impl WaveArgs {
    pub fn validate(&self) -> Result<WaveConfig, UsageError> {
        let (Some(serial_number), Some(sample_period)) = (&self.serial_number, &self.sample_period)
        else {
            return Err(UsageError::MissingArgument);
        };

        if serial_number.len() != 10 || !is_digits(serial_number) {
            return Err(UsageError::SerialNumber);
        }
        let serial_number = serial_number
            .parse()
            .map_err(|_| UsageError::SerialNumber)?;

        if !is_digits(sample_period) {
            return Err(UsageError::SamplePeriod);
        }
        let sample_period = sample_period
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| UsageError::SamplePeriod)?;

        let mode = match &self.mode {
            None => OutputMode::default(),
            Some(mode) => OutputMode::from_str(mode, true).map_err(|_| UsageError::Mode)?,
        };

        Ok(WaveConfig {
            serial_number,
            sample_period,
            mode,
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Configuration of `read_wave2`.
#[derive(Parser, Clone, Copy, Debug, PartialEq, Eq)]
#[command(
    name = "read_wave2",
    about = "Read current values from a 2nd Gen Wave product",
    version
)]
pub struct Wave2Config {
    /// Airthings device serial number found under the magnetic backplate.
    #[arg(value_name = "SERIAL_NUMBER")]
    pub serial_number: SerialNumber,
    /// Time in seconds between reading the current values.
    #[arg(value_name = "SAMPLE_PERIOD", default_value_t = 60)]
    pub sample_period: u64,
    /// Connection attempts per sample before giving up.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,
}

impl Wave2Config {
    pub const fn sample_period(&self) -> Duration {
        Duration::from_secs(self.sample_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(args: &[&str]) -> Result<WaveConfig, UsageError> {
        WaveArgs::try_parse_from(std::iter::once("read_wave").chain(args.iter().copied()))
            .unwrap()
            .validate()
    }

    #[test]
    fn wave_defaults_to_terminal() {
        assert_eq!(
            validate(&["2900012345", "60"]),
            Ok(WaveConfig {
                serial_number: SerialNumber(2_900_012_345),
                sample_period: Duration::from_secs(60),
                mode: OutputMode::Terminal
            })
        );
    }

    #[test]
    fn wave_pipe_mode_ignores_case() {
        assert_eq!(validate(&["2900012345", "0", "PIPE"]).unwrap().mode, OutputMode::Pipe);
    }

    #[test]
    fn wave_invalid_arguments() {
        assert_eq!(validate(&[]), Err(UsageError::MissingArgument));
        assert_eq!(validate(&["2900012345"]), Err(UsageError::MissingArgument));
        assert_eq!(validate(&["290001234", "60"]), Err(UsageError::SerialNumber));
        assert_eq!(validate(&["29000123x5", "60"]), Err(UsageError::SerialNumber));
        assert_eq!(validate(&["9999999999", "60"]), Err(UsageError::SerialNumber));
        assert_eq!(validate(&["2900012345", "-1"]), Err(UsageError::SamplePeriod));
        assert_eq!(validate(&["2900012345", "1.5"]), Err(UsageError::SamplePeriod));
        assert_eq!(validate(&["2900012345", "60", "file"]), Err(UsageError::Mode));
        assert_eq!(validate(&["-123456789", "60"]), Err(UsageError::SerialNumber));
        assert_eq!(validate(&["2900012345", "60", "-x"]), Err(UsageError::Mode));
    }

    #[test]
    fn wave_ignores_extra_arguments() {
        assert_eq!(
            validate(&["2900012345", "60", "pipe", "extra", "-v"]),
            Ok(WaveConfig {
                serial_number: SerialNumber(2_900_012_345),
                sample_period: Duration::from_secs(60),
                mode: OutputMode::Pipe
            })
        );
    }

    #[test]
    fn wave_parse_errors_are_usage_errors() {
        let help = WaveArgs::try_parse_from(["read_wave", "--help"]).unwrap_err();
        assert_eq!(UsageError::from_clap(&help), None);
        let version = WaveArgs::try_parse_from(["read_wave", "--version"]).unwrap_err();
        assert_eq!(UsageError::from_clap(&version), None);
        let error = clap::Error::new(ErrorKind::UnknownArgument);
        assert_eq!(UsageError::from_clap(&error), Some(UsageError::Unrecognized));
    }

    #[test]
    fn wave2_defaults() {
        let config = Wave2Config::try_parse_from(["read_wave2", "2950012345"]).unwrap();
        assert_eq!(config.serial_number, SerialNumber(2_950_012_345));
        assert_eq!(config.sample_period(), Duration::from_secs(60));
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn wave2_arguments() {
        let config =
            Wave2Config::try_parse_from(["read_wave2", "2950012345", "300", "--retries", "5"])
                .unwrap();
        assert_eq!(config.sample_period, 300);
        assert_eq!(config.retries, 5);
        assert!(Wave2Config::try_parse_from(["read_wave2"]).is_err());
        assert!(Wave2Config::try_parse_from(["read_wave2", "abc"]).is_err());
        assert!(Wave2Config::try_parse_from(["read_wave2", "1", "60", "--retries", "0"]).is_err());
    }
}
