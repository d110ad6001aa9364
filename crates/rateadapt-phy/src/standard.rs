//! # Standard Presets
//!
//! Builds the device capability descriptor a radio configured for a given
//! IEEE 802.11 amendment would report.
//!
//! | Standard        | Legacy set        | MCS tiers     | Width | Default mode   |
//! |-----------------|-------------------|---------------|-------|----------------|
//! | 802.11a         | OFDM              | –             | 20    | OFDM 6 Mb/s    |
//! | 802.11b         | DSSS              | –             | 22    | DSSS 1 Mb/s    |
//! | 802.11g         | DSSS + ERP-OFDM   | –             | 20    | DSSS 1 Mb/s    |
//! | 802.11n-2.4ghz  | DSSS + ERP-OFDM   | HT            | 20    | DSSS 1 Mb/s    |
//! | 802.11n-5ghz    | OFDM              | HT            | 20    | OFDM 6 Mb/s    |
//! | 802.11ac        | OFDM              | HT, VHT       | 80    | OFDM 6 Mb/s    |
//! | 802.11ax-2.4ghz | DSSS + ERP-OFDM   | HT, HE        | 20    | DSSS 1 Mb/s    |
//! | 802.11ax-5ghz   | OFDM              | HT, VHT, HE   | 80    | OFDM 6 Mb/s    |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::capabilities::DeviceCapabilities;
use crate::mode::{TransmissionMode, DSSS_MODES, ERP_OFDM_MODES, HE_MCS, HT_MCS, OFDM_MODES, VHT_MCS};
use crate::tx_config::DEFAULT_GUARD_INTERVAL_NS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WifiStandard {
    #[serde(rename = "802.11a")]
    Dot11a,
    #[serde(rename = "802.11b")]
    Dot11b,
    #[serde(rename = "802.11g")]
    Dot11g,
    #[serde(rename = "802.11n-2.4ghz")]
    Dot11n2_4Ghz,
    #[serde(rename = "802.11n-5ghz")]
    Dot11n5Ghz,
    #[serde(rename = "802.11ac")]
    Dot11ac,
    #[serde(rename = "802.11ax-2.4ghz")]
    Dot11ax2_4Ghz,
    #[serde(rename = "802.11ax-5ghz")]
    Dot11ax5Ghz,
}

impl WifiStandard {
    pub const ALL: [WifiStandard; 8] = [
        WifiStandard::Dot11a,
        WifiStandard::Dot11b,
        WifiStandard::Dot11g,
        WifiStandard::Dot11n2_4Ghz,
        WifiStandard::Dot11n5Ghz,
        WifiStandard::Dot11ac,
        WifiStandard::Dot11ax2_4Ghz,
        WifiStandard::Dot11ax5Ghz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WifiStandard::Dot11a => "802.11a",
            WifiStandard::Dot11b => "802.11b",
            WifiStandard::Dot11g => "802.11g",
            WifiStandard::Dot11n2_4Ghz => "802.11n-2.4ghz",
            WifiStandard::Dot11n5Ghz => "802.11n-5ghz",
            WifiStandard::Dot11ac => "802.11ac",
            WifiStandard::Dot11ax2_4Ghz => "802.11ax-2.4ghz",
            WifiStandard::Dot11ax5Ghz => "802.11ax-5ghz",
        }
    }

    fn is_2_4ghz(&self) -> bool {
        matches!(
            self,
            WifiStandard::Dot11b
                | WifiStandard::Dot11g
                | WifiStandard::Dot11n2_4Ghz
                | WifiStandard::Dot11ax2_4Ghz
        )
    }

    /// Legacy rates the band carries.
    fn legacy_modes(&self) -> Vec<TransmissionMode> {
        match self {
            WifiStandard::Dot11b => DSSS_MODES.to_vec(),
            s if s.is_2_4ghz() => DSSS_MODES.iter().chain(ERP_OFDM_MODES).copied().collect(),
            _ => OFDM_MODES.to_vec(),
        }
    }

    /// Mandatory basic rate set.
    fn basic_modes(&self) -> Vec<TransmissionMode> {
        match self {
            WifiStandard::Dot11b => DSSS_MODES[..2].to_vec(),
            s if s.is_2_4ghz() => DSSS_MODES.to_vec(),
            _ => vec![OFDM_MODES[0], OFDM_MODES[2], OFDM_MODES[4]],
        }
    }

    /// Capability descriptor of a single-stream radio running this standard.
    pub fn device_capabilities(&self) -> DeviceCapabilities {
        let (ht, vht, he) = match self {
            WifiStandard::Dot11a | WifiStandard::Dot11b | WifiStandard::Dot11g => {
                (false, false, false)
            }
            WifiStandard::Dot11n2_4Ghz | WifiStandard::Dot11n5Ghz => (true, false, false),
            WifiStandard::Dot11ac => (true, true, false),
            WifiStandard::Dot11ax2_4Ghz => (true, false, true),
            WifiStandard::Dot11ax5Ghz => (true, true, true),
        };

        let mut modes = self.legacy_modes();
        if ht {
            modes.extend_from_slice(HT_MCS);
        }
        if vht {
            modes.extend_from_slice(VHT_MCS);
        }
        if he {
            modes.extend_from_slice(HE_MCS);
        }

        let channel_width_mhz = match self {
            WifiStandard::Dot11b => 22,
            WifiStandard::Dot11ac | WifiStandard::Dot11ax5Ghz => 80,
            _ => 20,
        };
        let default_mode = if self.is_2_4ghz() {
            DSSS_MODES[0]
        } else {
            OFDM_MODES[0]
        };

        DeviceCapabilities {
            modes,
            basic_modes: self.basic_modes(),
            default_mode,
            ht,
            vht,
            he,
            channel_width_mhz,
            spatial_streams: 1,
            short_guard_interval: false,
            he_guard_interval_ns: DEFAULT_GUARD_INTERVAL_NS,
        }
    }
}

impl fmt::Display for WifiStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WifiStandard::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == wanted)
            .ok_or_else(|| format!("Unknown Wi-Fi standard {:?}", s))
    }
}
