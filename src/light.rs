use tracing::debug;

use crate::{
    brightness,
    error::{Error, Result},
    sysfs::{parse_lenient, Subsystem, Sysfs, SysfsDevice},
};

const BRIGHTNESS: &str = "brightness";
const MAX_BRIGHTNESS: &str = "max_brightness";

/// A backlight or led together with the last brightness read from (or
/// written to) it.
///
/// Every constructor reads both attributes before handing the value out, so
/// a `Light` never carries made up numbers. Dropping it releases the device.
#[derive(Debug)]
pub struct Light {
    device: SysfsDevice,
    max_brightness: u32,
    brightness: u32,
}

impl Light {
    fn open(device: SysfsDevice) -> Result<Light> {
        let mut light = Self {
            device,
            max_brightness: 0,
            brightness: 0,
        };
        light.read()?;

        debug!(
            name = light.name(),
            subsystem = %light.subsystem(),
            brightness = light.brightness,
            max_brightness = light.max_brightness,
            "resolved light"
        );
        Ok(light)
    }

    /// Finds `name` among backlights first, then leds.
    pub fn resolve_by_name(sysfs: &Sysfs, name: &str) -> Result<Light> {
        let device = Subsystem::ALL
            .iter()
            .find_map(|&subsystem| sysfs.class(subsystem).device(name))
            .ok_or_else(|| Error::DeviceNotFound(name.to_string()))?;

        Self::open(device)
    }

    /// The first backlight in enumeration order. Leds are never picked.
    pub fn resolve_default(sysfs: &Sysfs) -> Result<Light> {
        let device = sysfs
            .class(Subsystem::Backlight)
            .enum_devices()?
            .into_iter()
            .next()
            .ok_or(Error::NoDeviceFound)?;

        Self::open(device)
    }

    /// `resolve_by_name` when a name is given, `resolve_default` otherwise.
    pub fn resolve(sysfs: &Sysfs, name: Option<&str>) -> Result<Light> {
        match name {
            Some(name) => Self::resolve_by_name(sysfs, name),
            None => Self::resolve_default(sysfs),
        }
    }

    /// Every backlight followed by every led. One bad device fails the
    /// whole listing.
    pub fn enumerate_all(sysfs: &Sysfs) -> Result<Vec<Light>> {
        let mut ret = Vec::new();
        for subsystem in Subsystem::ALL {
            for device in sysfs.class(subsystem).enum_devices()? {
                ret.push(Self::open(device)?);
            }
        }

        Ok(ret)
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.device.name()
    }

    #[inline]
    pub fn subsystem(&self) -> Subsystem {
        self.device.subsystem()
    }

    #[inline]
    pub fn brightness(&self) -> u32 {
        self.brightness
    }

    #[inline]
    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Current brightness as a share of the maximum, 0 for devices that
    /// report a maximum of 0.
    pub fn percentage(&self) -> f64 {
        brightness::percentage(self.brightness, self.max_brightness)
    }

    /// Refreshes both attributes from the device.
    pub fn read(&mut self) -> Result<()> {
        let brightness = self.attribute(BRIGHTNESS)?;
        let max_brightness = self.attribute(MAX_BRIGHTNESS)?;

        self.brightness = parse_lenient(&brightness);
        self.max_brightness = parse_lenient(&max_brightness);
        Ok(())
    }

    /// Writes `brightness`, clamped to the maximum. The stored value only
    /// changes once the device accepted it; nothing is read back.
    pub fn write(&mut self, brightness: u32) -> Result<()> {
        let brightness = brightness.min(self.max_brightness);

        self.device
            .set_value(BRIGHTNESS, &brightness.to_string())
            .map_err(|source| Error::WriteFailed {
                device: self.name().to_string(),
                source,
            })?;

        debug!(name = self.name(), brightness, "wrote brightness");
        self.brightness = brightness;
        Ok(())
    }

    fn attribute(&self, attribute: &'static str) -> Result<String> {
        self.device
            .get_value(attribute)
            .map_err(|source| Error::AttributeReadFailed {
                device: self.name().to_string(),
                attribute,
                source,
            })
    }
}
