use std::path::Path;

use anyhow::Context;
use rateadapt_phy::mode::{mode_by_name, Tier};
use rateadapt_phy::{DeviceCapabilities, TransmissionMode, WifiStandard};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::thresholds::DEFAULT_BER_THRESHOLD;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdealConfigInput {
    pub version: u32,
    pub manager: ManagerConfigInput,
    pub device: DeviceConfigInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagerConfigInput {
    pub ber_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfigInput {
    pub standard: Option<String>,
    pub channel_width_mhz: Option<u16>,
    pub spatial_streams: Option<u8>,
    pub short_guard_interval: Option<bool>,
    pub he_guard_interval_ns: Option<u16>,
    pub basic_modes: Option<Vec<String>>,
    pub default_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Per-bit error probability thresholds are solved for.
    pub ber_threshold: f64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            ber_threshold: DEFAULT_BER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub standard: WifiStandard,
    /// Preset for `standard` with the overrides applied.
    pub capabilities: DeviceCapabilities,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let standard = WifiStandard::Dot11a;
        Self {
            standard,
            capabilities: standard.device_capabilities(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdealConfig {
    pub version: u32,
    pub manager: ManagerConfig,
    pub device: DeviceConfig,
}

impl Default for IdealConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            manager: ManagerConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl IdealConfigInput {
    pub fn resolve(self) -> Result<IdealConfig, ConfigError> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let ber_threshold = self
            .manager
            .ber_threshold
            .unwrap_or(ManagerConfig::default().ber_threshold);
        if !(ber_threshold > 0.0 && ber_threshold < 1.0) {
            return Err(ConfigError::InvalidBerThreshold(ber_threshold));
        }

        Ok(IdealConfig {
            version,
            manager: ManagerConfig { ber_threshold },
            device: self.device.resolve()?,
        })
    }
}

impl DeviceConfigInput {
    fn resolve(self) -> Result<DeviceConfig, ConfigError> {
        let standard = match self.standard.as_deref().map(str::trim) {
            None | Some("") => DeviceConfig::default().standard,
            Some(name) => name
                .parse::<WifiStandard>()
                .map_err(|_| ConfigError::UnknownStandard(name.to_string()))?,
        };

        let mut caps = standard.device_capabilities();
        if let Some(width) = self.channel_width_mhz {
            caps.channel_width_mhz = width;
        }
        if let Some(streams) = self.spatial_streams {
            caps.spatial_streams = streams;
        }
        if let Some(short_gi) = self.short_guard_interval {
            caps.short_guard_interval = short_gi;
        }
        if let Some(gi) = self.he_guard_interval_ns {
            caps.he_guard_interval_ns = gi;
        }
        if let Some(names) = self.basic_modes {
            caps.basic_modes = names
                .iter()
                .map(|name| legacy_mode(name))
                .collect::<Result<_, _>>()?;
        }
        if let Some(name) = self.default_mode {
            caps.default_mode = legacy_mode(&name)?;
        }

        Ok(DeviceConfig {
            standard,
            capabilities: caps,
        })
    }
}

fn legacy_mode(name: &str) -> Result<TransmissionMode, ConfigError> {
    let trimmed = name.trim();
    let mode = mode_by_name(trimmed).ok_or_else(|| ConfigError::UnknownMode(trimmed.to_string()))?;
    if mode.tier() != Tier::Legacy {
        return Err(ConfigError::NotLegacyMode(trimmed.to_string()));
    }
    Ok(mode)
}

impl IdealConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(IdealConfig::default());
        }
        let parsed: IdealConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    /// Read and resolve a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
