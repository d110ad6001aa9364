//! Local-device and remote-peer capability descriptors.
//!
//! The device descriptor is queried once when the rate manager is built;
//! peer descriptors arrive with association/discovery and may be replaced
//! whenever the peer re-advertises.

use crate::mode::{Tier, TransmissionMode};
use crate::tx_config::{DEFAULT_GUARD_INTERVAL_NS, SHORT_GUARD_INTERVAL_NS};

/// What the local radio can transmit.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Supported modes in catalog order: legacy rates first, then MCSes.
    pub modes: Vec<TransmissionMode>,
    /// Basic rate set used for protective (RTS) frames. Legacy modes only.
    pub basic_modes: Vec<TransmissionMode>,
    /// Most robust legacy mode, used whenever nothing else clears the SNR.
    pub default_mode: TransmissionMode,
    pub ht: bool,
    pub vht: bool,
    pub he: bool,
    /// Maximum operating channel width.
    pub channel_width_mhz: u16,
    /// Maximum transmit spatial streams.
    pub spatial_streams: u8,
    /// HT/VHT short guard interval (400 ns) support.
    pub short_guard_interval: bool,
    /// HE guard interval in nanoseconds (800, 1600 or 3200).
    pub he_guard_interval_ns: u16,
}

impl DeviceCapabilities {
    /// Legacy-only device sending every mode at its width class.
    pub fn legacy(modes: Vec<TransmissionMode>) -> Self {
        let default_mode = modes
            .iter()
            .copied()
            .find(|m| m.tier() == Tier::Legacy)
            .unwrap_or(crate::mode::OFDM_MODES[0]);
        DeviceCapabilities {
            basic_modes: vec![default_mode],
            default_mode,
            modes,
            ht: false,
            vht: false,
            he: false,
            channel_width_mhz: 20,
            spatial_streams: 1,
            short_guard_interval: false,
            he_guard_interval_ns: DEFAULT_GUARD_INTERVAL_NS,
        }
    }

    /// Whether the device advertises `tier`. Legacy is always supported.
    pub fn supports(&self, tier: Tier) -> bool {
        match tier {
            Tier::Legacy => true,
            Tier::Ht => self.ht,
            Tier::Vht => self.vht,
            Tier::He => self.he,
        }
    }

    /// Whether any HT-or-newer tier is enabled.
    pub fn has_mcs_support(&self) -> bool {
        self.ht || self.vht || self.he
    }

    pub fn legacy_modes(&self) -> impl Iterator<Item = TransmissionMode> + '_ {
        self.modes.iter().copied().filter(|m| m.tier() == Tier::Legacy)
    }

    pub fn mcs_modes(&self) -> impl Iterator<Item = TransmissionMode> + '_ {
        self.modes.iter().copied().filter(|m| m.is_mcs())
    }

    /// Guard interval the device uses for HT and VHT frames.
    pub fn ht_guard_interval_ns(&self) -> u16 {
        guard_interval_for(self.short_guard_interval)
    }
}

/// What a remote peer advertised.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerCapabilities {
    /// Supported legacy rates and MCSes.
    pub modes: Vec<TransmissionMode>,
    pub ht: bool,
    pub vht: bool,
    pub he: bool,
    pub channel_width_mhz: u16,
    pub spatial_streams: u8,
    pub short_guard_interval: bool,
    pub he_guard_interval_ns: u16,
}

impl PeerCapabilities {
    /// A legacy-only peer supporting `modes`.
    pub fn legacy(modes: Vec<TransmissionMode>) -> Self {
        PeerCapabilities {
            modes,
            ht: false,
            vht: false,
            he: false,
            channel_width_mhz: 20,
            spatial_streams: 1,
            short_guard_interval: false,
            he_guard_interval_ns: DEFAULT_GUARD_INTERVAL_NS,
        }
    }

    /// A peer advertising exactly what `device` supports.
    pub fn matching(device: &DeviceCapabilities) -> Self {
        PeerCapabilities {
            modes: device.modes.clone(),
            ht: device.ht,
            vht: device.vht,
            he: device.he,
            channel_width_mhz: device.channel_width_mhz,
            spatial_streams: device.spatial_streams,
            short_guard_interval: device.short_guard_interval,
            he_guard_interval_ns: device.he_guard_interval_ns,
        }
    }

    pub fn supports(&self, tier: Tier) -> bool {
        match tier {
            Tier::Legacy => true,
            Tier::Ht => self.ht,
            Tier::Vht => self.vht,
            Tier::He => self.he,
        }
    }

    pub fn supports_mode(&self, mode: &TransmissionMode) -> bool {
        self.modes.contains(mode)
    }

    pub fn ht_guard_interval_ns(&self) -> u16 {
        guard_interval_for(self.short_guard_interval)
    }
}

fn guard_interval_for(short_guard_interval: bool) -> u16 {
    if short_guard_interval {
        SHORT_GUARD_INTERVAL_NS
    } else {
        DEFAULT_GUARD_INTERVAL_NS
    }
}
