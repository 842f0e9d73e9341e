use std::{
    env,
    fmt,
    fs,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Where the kernel mounts sysfs.
pub const DEFAULT_ROOT: &str = "/sys";

/// Overrides [`DEFAULT_ROOT`], mostly useful for pointing the tool at a fake tree.
pub const ROOT_ENV: &str = "ULCTL_SYSFS_ROOT";

/// Device classes that carry a `brightness`/`max_brightness` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subsystem {
    Backlight,
    Leds,
}

impl Subsystem {
    /// Search order used everywhere: backlights before leds.
    pub const ALL: [Subsystem; 2] = [Subsystem::Backlight, Subsystem::Leds];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Backlight => "backlight",
            Subsystem::Leds => "leds",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session on a sysfs tree. Every lookup goes through one of these, so the
/// tree can be swapped out without touching global state.
#[derive(Debug)]
pub struct Sysfs {
    root: PathBuf,
}

impl Sysfs {
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Sysfs> {
        let root = root.into();
        if !root.join("class").is_dir() {
            return Err(Error::RegistryUnavailable { root });
        }

        debug!(root = %root.display(), "opened device registry");
        Ok(Self { root })
    }

    /// Opens the tree named by `ULCTL_SYSFS_ROOT`, falling back to `/sys`.
    pub fn open_default() -> Result<Sysfs> {
        let root = env::var_os(ROOT_ENV)
            .filter(|root| !root.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        Self::open(root)
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class(&self, subsystem: Subsystem) -> SysfsClass {
        SysfsClass {
            subsystem,
            path: self.root.join("class").join(subsystem.as_str()),
        }
    }
}

#[derive(Debug)]
pub struct SysfsClass {
    subsystem: Subsystem,
    path: PathBuf,
}

impl SysfsClass {
    #[inline]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// Looks up a single device by its sysfs name.
    pub fn device(&self, name: &str) -> Option<SysfsDevice> {
        // names are single path components, anything else can't be a device
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return None;
        }

        let path = self.path.join(name);
        if path.is_dir() {
            Some(SysfsDevice {
                subsystem: self.subsystem,
                name: name.to_string(),
                path,
            })
        } else {
            None
        }
    }

    /// Lists devices in directory order. A class that doesn't exist on this
    /// machine is simply empty.
    pub fn enum_devices(&self) -> Result<Vec<SysfsDevice>> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(subsystem = %self.subsystem, "no such device class");
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.scan_failed(source)),
        };

        let mut ret = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| self.scan_failed(source))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    debug!(?name, "skipping device with non utf-8 name");
                    continue;
                }
            };

            if let Some(device) = self.device(&name) {
                ret.push(device);
            }
        }

        trace!(subsystem = %self.subsystem, count = ret.len(), "enumerated devices");
        Ok(ret)
    }

    fn scan_failed(&self, source: io::Error) -> Error {
        Error::EnumerationFailed {
            subsystem: self.subsystem,
            source,
        }
    }
}

/// One device directory, e.g. `/sys/class/backlight/intel_backlight`.
///
/// Not `Clone`: the holder owns the device.
#[derive(Debug)]
pub struct SysfsDevice {
    subsystem: Subsystem,
    name: String,
    path: PathBuf,
}

impl SysfsDevice {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_value(&self, attr: &str) -> Result<String, io::Error> {
        let value = fs::read_to_string(self.path.join(attr))?;
        trace!(device = %self.name, attr, value = value.trim(), "read attribute");
        Ok(value.trim().to_string())
    }

    pub fn set_value(&self, attr: &str, data: &str) -> Result<(), io::Error> {
        trace!(device = %self.name, attr, data, "write attribute");
        fs::write(self.path.join(attr), data)
    }
}

/// Reads an unsigned decimal the way `strtoul` would: leading whitespace and
/// a `+` are skipped, digits are taken up to the first non-digit, and input
/// without any digits is 0. Overflow saturates.
pub fn parse_lenient(value: &str) -> u32 {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);

    value
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u32::from(digit - b'0'))
        })
}
