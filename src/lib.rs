//! Backlight and led brightness control on top of sysfs.

pub mod brightness;
pub mod error;
pub mod light;
pub mod output;
pub mod sysfs;

pub use crate::{
    brightness::Mode,
    error::{Error, Result, EX_FAILURE, EX_USAGE},
    light::Light,
    output::{Formatter, Stdout, Terminal},
    sysfs::{Subsystem, Sysfs, SysfsClass, SysfsDevice},
};
