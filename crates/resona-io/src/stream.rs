//! Output device discovery via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default output channel count.
    pub channels: u16,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Output stream configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Buffer size in frames.
    pub buffer_size: u32,
    /// Output device name, index or name fragment (uses default if `None`).
    pub output_device: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            output_device: None,
        }
    }
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (channels, default_sample_rate) = device
        .default_output_config()
        .map(|c| (c.channels(), c.sample_rate()))
        .unwrap_or((2, 48000));
    Some(AudioDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        channels,
        default_sample_rate,
    })
}

/// List all output devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    let mut devices: Vec<AudioDevice> = Vec::new();
    for device in outputs {
        if let Some(info) = describe(&device, default_name.as_deref())
            && !devices.iter().any(|d| d.name == info.name)
        {
            devices.push(info);
        }
    }
    Ok(devices)
}

/// The host's default output device, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok();
        describe(&d, name.as_deref())
    }))
}

/// Find an output device by index, exact name, or case-insensitive
/// fragment. `None` selects the default device.
pub(crate) fn find_output_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    let Some(search) = name_or_index else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = search.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    if let Some(device) = devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n == search))
    {
        return Ok(device.clone());
    }

    let search_lower = search.to_lowercase();
    devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n.to_lowercase().contains(&search_lower)))
        .cloned()
        .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{search}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        // Device availability depends on the system; this only must not fail
        // when a host is present.
        if let Ok(devices) = list_devices() {
            assert!(devices.iter().filter(|d| d.is_default).count() <= 1);
        }
    }

    #[test]
    fn test_default_stream_config() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 256);
        assert!(config.output_device.is_none());
    }

    #[test]
    fn test_missing_device_reported() {
        let host = cpal::default_host();
        let result = find_output_device(&host, Some("no-such-device-resona-test"));
        assert!(matches!(
            result,
            Err(Error::DeviceNotFound(_) | Error::Stream(_))
        ));
    }
}
