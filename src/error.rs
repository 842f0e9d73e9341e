use std::{
    io,
    path::PathBuf,
};

use thiserror::Error;

use crate::sysfs::Subsystem;

/// Exit status for malformed command line input (sysexits `EX_USAGE`).
pub const EX_USAGE: u8 = 64;

/// Exit status for everything that went wrong after the input was accepted.
pub const EX_FAILURE: u8 = 1;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("device registry is unavailable at {}", root.display())]
    RegistryUnavailable { root: PathBuf },

    #[error("no backlight or leds device named \"{0}\"")]
    DeviceNotFound(String),

    #[error("unable to find light device")]
    NoDeviceFound,

    #[error("failed to scan {subsystem} devices")]
    EnumerationFailed {
        subsystem: Subsystem,
        #[source]
        source: io::Error,
    },

    #[error("failed to get {attribute} of {device}")]
    AttributeReadFailed {
        device: String,
        attribute: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("unable to set brightness of {device}")]
    WriteFailed {
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("brightness value \"{value}\" is out of range (0-{max})")]
    ValueOutOfRange { value: String, max: u32 },

    #[error("brightness step \"{0}\" must not be negative")]
    NegativeStep(String),
}

impl Error {
    /// Process exit status for this error. Bad caller input maps to
    /// [`EX_USAGE`], device and registry failures to [`EX_FAILURE`].
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) | Error::ValueOutOfRange { .. } | Error::NegativeStep(_) => EX_USAGE,
            _ => EX_FAILURE,
        }
    }

    /// Replaces the number in range errors with the argument as it was typed.
    pub fn with_input(self, raw: &str) -> Error {
        match self {
            Error::ValueOutOfRange { max, .. } => Error::ValueOutOfRange {
                value: raw.to_string(),
                max,
            },
            Error::NegativeStep(_) => Error::NegativeStep(raw.to_string()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_input_errors_are_usage_errors() {
        assert_eq!(Error::Usage("No value provided".into()).exit_code(), EX_USAGE);
        assert_eq!(Error::ValueOutOfRange { value: "150".into(), max: 100 }.exit_code(), EX_USAGE);
        assert_eq!(Error::NegativeStep("-1".into()).exit_code(), EX_USAGE);
    }

    #[test]
    fn device_errors_are_runtime_failures() {
        assert_eq!(Error::NoDeviceFound.exit_code(), EX_FAILURE);
        assert_eq!(Error::DeviceNotFound("x".into()).exit_code(), EX_FAILURE);
        let err = Error::WriteFailed {
            device: "intel_backlight".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), EX_FAILURE);
    }

    #[test]
    fn out_of_range_message_names_the_bound() {
        let err = Error::ValueOutOfRange { value: "300".into(), max: 255 };
        assert_eq!(err.to_string(), "brightness value \"300\" is out of range (0-255)");
    }

    #[test]
    fn range_errors_echo_the_typed_argument() {
        let err = Error::ValueOutOfRange { value: "1000".into(), max: 100 }.with_input("1e3");
        assert_eq!(err.to_string(), "brightness value \"1e3\" is out of range (0-100)");

        let err = Error::NegativeStep("-0.5".into()).with_input("-.5");
        assert_eq!(err.to_string(), "brightness step \"-.5\" must not be negative");

        assert!(matches!(Error::NoDeviceFound.with_input("5"), Error::NoDeviceFound));
    }
}
