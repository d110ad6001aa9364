//! Complete transmission configuration (the "TX vector") and the rules that
//! decide whether a combination of mode, streams, guard interval and width
//! can actually be put on air.

use serde::Serialize;
use std::fmt;

use crate::mode::{ModulationClass, TransmissionMode};

/// Guard interval every legacy and long-GI HT/VHT transmission uses.
pub const DEFAULT_GUARD_INTERVAL_NS: u16 = 800;
/// HT/VHT short guard interval.
pub const SHORT_GUARD_INTERVAL_NS: u16 = 400;
/// HE guard intervals (0.8, 1.6 and 3.2 µs).
pub const HE_GUARD_INTERVALS_NS: [u16; 3] = [800, 1600, 3200];

/// Channel widths HT and newer can be configured with.
pub const MCS_CHANNEL_WIDTHS_MHZ: [u16; 4] = [20, 40, 80, 160];

/// Mode, spatial-stream count, guard interval and channel width of one frame.
///
/// Two configurations are equal iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TxConfig {
    pub mode: TransmissionMode,
    pub nss: u8,
    pub guard_interval_ns: u16,
    pub channel_width_mhz: u16,
}

impl TxConfig {
    pub fn new(mode: TransmissionMode, nss: u8, guard_interval_ns: u16, channel_width_mhz: u16) -> Self {
        TxConfig {
            mode,
            nss,
            guard_interval_ns,
            channel_width_mhz,
        }
    }

    /// Single-stream, long-GI configuration at the mode's width class.
    pub fn legacy(mode: TransmissionMode) -> Self {
        TxConfig::new(mode, 1, DEFAULT_GUARD_INTERVAL_NS, mode.width_class_mhz())
    }

    /// Nominal data rate of this configuration in bits per second.
    pub fn data_rate(&self) -> u64 {
        self.mode
            .data_rate(self.channel_width_mhz, self.guard_interval_ns, self.nss)
    }

    /// Whether the combination is transmittable.
    pub fn is_valid(&self) -> bool {
        let mcs = self.mode.mcs();
        let width = self.channel_width_mhz;
        let nss = self.nss;
        let gi = self.guard_interval_ns;
        match self.mode.class() {
            ModulationClass::Dsss | ModulationClass::HrDsss => nss == 1 && matches!(width, 20 | 22),
            ModulationClass::Ofdm | ModulationClass::ErpOfdm => {
                nss == 1 && matches!(width, 5 | 10 | 20)
            }
            ModulationClass::Ht => {
                matches!(width, 20 | 40)
                    && matches!(gi, SHORT_GUARD_INTERVAL_NS | DEFAULT_GUARD_INTERVAL_NS)
                    && mcs < 32
                    && nss == self.mode.ht_spatial_streams()
            }
            ModulationClass::Vht => {
                MCS_CHANNEL_WIDTHS_MHZ.contains(&width)
                    && matches!(gi, SHORT_GUARD_INTERVAL_NS | DEFAULT_GUARD_INTERVAL_NS)
                    && (1..=8).contains(&nss)
                    && mcs < 10
                    && !vht_combination_excluded(mcs, nss, width)
            }
            ModulationClass::He => {
                MCS_CHANNEL_WIDTHS_MHZ.contains(&width)
                    && HE_GUARD_INTERVALS_NS.contains(&gi)
                    && (1..=8).contains(&nss)
                    && mcs < 12
            }
        }
    }
}

/// VHT MCS/NSS/width triples that 802.11ac leaves undefined because the data
/// bits per symbol would not be an integer.
fn vht_combination_excluded(mcs: u8, nss: u8, width: u16) -> bool {
    match (width, mcs) {
        (20, 9) => nss != 3 && nss != 6,
        (80, 6) => nss == 3 || nss == 7,
        (160, 9) => nss == 3,
        _ => false,
    }
}

impl fmt::Display for TxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nss={} gi={}ns width={}MHz",
            self.mode, self.nss, self.guard_interval_ns, self.channel_width_mhz
        )
    }
}

/// Widths `20, 40, 80, 160` that do not exceed `max_width_mhz`.
pub fn widths_up_to(max_width_mhz: u16) -> impl Iterator<Item = u16> {
    MCS_CHANNEL_WIDTHS_MHZ
        .into_iter()
        .filter(move |w| *w <= max_width_mhz)
}

/// Largest power-of-two multiple of 20 MHz not above `width_mhz`, never below 20.
pub fn normalize_width(width_mhz: u16) -> u16 {
    widths_up_to(width_mhz).last().unwrap_or(20)
}

/// Linear SNR ratio to decibels.
pub fn ratio_to_db(ratio: f64) -> f64 {
    10.0 * ratio.log10()
}

/// Decibels to a linear SNR ratio.
pub fn db_to_ratio(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{DSSS_MODES, HE_MCS, HT_MCS, OFDM_MODES, VHT_MCS};

    #[test]
    fn legacy_config_uses_width_class() {
        let dsss = TxConfig::legacy(DSSS_MODES[0]);
        assert_eq!(dsss.channel_width_mhz, 22);
        assert_eq!(dsss.nss, 1);
        assert_eq!(dsss.guard_interval_ns, DEFAULT_GUARD_INTERVAL_NS);
        assert!(dsss.is_valid());

        let ofdm = TxConfig::legacy(OFDM_MODES[4]);
        assert_eq!(ofdm.channel_width_mhz, 20);
        assert_eq!(ofdm.data_rate(), 24_000_000);
        assert!(ofdm.is_valid());
    }

    #[test]
    fn equality_covers_all_fields() {
        let a = TxConfig::new(VHT_MCS[3], 1, 800, 40);
        assert_eq!(a, TxConfig::new(VHT_MCS[3], 1, 800, 40));
        assert_ne!(a, TxConfig::new(VHT_MCS[3], 2, 800, 40));
        assert_ne!(a, TxConfig::new(VHT_MCS[3], 1, 400, 40));
        assert_ne!(a, TxConfig::new(VHT_MCS[3], 1, 800, 80));
        assert_ne!(a, TxConfig::new(VHT_MCS[4], 1, 800, 40));
    }

    #[test]
    fn ht_validity() {
        assert!(TxConfig::new(HT_MCS[7], 1, 400, 40).is_valid());
        assert!(TxConfig::new(HT_MCS[8], 2, 800, 20).is_valid());
        // NSS must match the MCS
        assert!(!TxConfig::new(HT_MCS[8], 1, 800, 20).is_valid());
        // HT stops at 40 MHz
        assert!(!TxConfig::new(HT_MCS[0], 1, 800, 80).is_valid());
        assert!(!TxConfig::new(HT_MCS[0], 1, 1600, 20).is_valid());
    }

    #[test]
    fn vht_exclusions() {
        assert!(!TxConfig::new(VHT_MCS[9], 1, 800, 20).is_valid());
        assert!(TxConfig::new(VHT_MCS[9], 3, 800, 20).is_valid());
        assert!(!TxConfig::new(VHT_MCS[6], 3, 800, 80).is_valid());
        assert!(TxConfig::new(VHT_MCS[6], 2, 800, 80).is_valid());
        assert!(!TxConfig::new(VHT_MCS[9], 3, 800, 160).is_valid());
        assert!(TxConfig::new(VHT_MCS[9], 1, 400, 160).is_valid());
    }

    #[test]
    fn he_validity() {
        assert!(TxConfig::new(HE_MCS[11], 2, 3200, 160).is_valid());
        assert!(!TxConfig::new(HE_MCS[0], 1, 400, 20).is_valid());
        assert!(!TxConfig::new(HE_MCS[0], 9, 800, 20).is_valid());
    }

    #[test]
    fn width_helpers() {
        assert_eq!(widths_up_to(80).collect::<Vec<_>>(), vec![20, 40, 80]);
        assert_eq!(widths_up_to(20).collect::<Vec<_>>(), vec![20]);
        assert_eq!(normalize_width(22), 20);
        assert_eq!(normalize_width(120), 80);
        assert_eq!(normalize_width(160), 160);
        assert_eq!(normalize_width(10), 20);
    }

    #[test]
    fn db_conversions() {
        assert!((ratio_to_db(100.0) - 20.0).abs() < 1e-9);
        assert!((db_to_ratio(3.0) - 1.995_262).abs() < 1e-5);
        assert!((db_to_ratio(ratio_to_db(42.0)) - 42.0).abs() < 1e-9);
    }
}
