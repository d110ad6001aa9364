//! # SNR Threshold Table
//!
//! Built once from the device capabilities and an error-rate model, then
//! read-only for the life of the manager.
//!
//! ## Enumerated configurations
//!
//! | Tier   | Widths                   | NSS                | Guard interval       |
//! |--------|--------------------------|--------------------|----------------------|
//! | Legacy | mode width class (20/22) | 1                  | 800 ns               |
//! | HT     | 20, 40, … ≤ device max   | MCS / 8 + 1        | 400 if short GI, 800 |
//! | VHT    | 20, 40, … ≤ device max   | 1 ..= device max   | 400 if short GI, 800 |
//! | HE     | 20, 40, … ≤ device max   | 1 ..= device max   | device HE GI         |
//!
//! Entries are keyed by `(mode, nss, width)`. The guard interval is recorded
//! on the stored configuration but does not take part in lookups.

use std::collections::HashMap;

use rateadapt_phy::mode::ModulationClass;
use rateadapt_phy::tx_config::widths_up_to;
use rateadapt_phy::{DeviceCapabilities, ErrorRateModel, TransmissionMode, TxConfig};
use tracing::{debug, info};

use crate::error::IdealError;

/// Default per-bit error probability thresholds are solved for.
pub const DEFAULT_BER_THRESHOLD: f64 = 1e-5;

/// Lookup key of one threshold entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThresholdKey {
    pub mode: TransmissionMode,
    pub nss: u8,
    pub channel_width_mhz: u16,
}

impl From<&TxConfig> for ThresholdKey {
    fn from(config: &TxConfig) -> Self {
        ThresholdKey {
            mode: config.mode,
            nss: config.nss,
            channel_width_mhz: config.channel_width_mhz,
        }
    }
}

/// Minimum linear SNR per enumerable transmission configuration.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    /// Insertion order: legacy modes, then MCSes by catalog order and width.
    entries: Vec<(TxConfig, f64)>,
    index: HashMap<ThresholdKey, usize>,
    target_error: f64,
}

impl ThresholdTable {
    /// Solve `model` for every configuration `device` can put on air.
    pub fn build(
        device: &DeviceCapabilities,
        model: &dyn ErrorRateModel,
        target_error: f64,
    ) -> Result<Self, IdealError> {
        if !(target_error > 0.0 && target_error < 1.0) {
            return Err(IdealError::InvalidTarget(target_error));
        }

        let mut table = ThresholdTable {
            entries: Vec::new(),
            index: HashMap::new(),
            target_error,
        };
        for config in enumerate_configs(device) {
            let key = ThresholdKey::from(&config);
            if table.index.contains_key(&key) {
                continue;
            }
            let snr = match model.min_snr(&config, target_error) {
                Some(snr) if snr.is_finite() && snr >= 0.0 => snr,
                _ => return Err(IdealError::UnreachableThreshold { config }),
            };
            debug!(config = %config, threshold = snr, "threshold");
            table.index.insert(key, table.entries.len());
            table.entries.push((config, snr));
        }

        info!(
            entries = table.entries.len(),
            target = target_error,
            "SNR threshold table built"
        );
        Ok(table)
    }

    /// Threshold for `config`, if it was enumerated.
    pub fn lookup(&self, config: &TxConfig) -> Option<f64> {
        self.index
            .get(&ThresholdKey::from(config))
            .map(|&i| self.entries[i].1)
    }

    /// Threshold for `config`.
    ///
    /// # Panics
    ///
    /// If `config` was never enumerated. The selector only asks for
    /// configurations drawn from the device catalog, so a miss means the
    /// table and the catalog disagree.
    pub fn threshold(&self, config: &TxConfig) -> f64 {
        match self.lookup(config) {
            Some(snr) => snr,
            None => panic!("no SNR threshold for {:?}", ThresholdKey::from(config)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target_error(&self) -> f64 {
        self.target_error
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TxConfig, f64)> {
        self.entries.iter().map(|(config, snr)| (config, *snr))
    }
}

/// Every configuration the table holds for `device`, in insertion order.
pub fn enumerate_configs(device: &DeviceCapabilities) -> Vec<TxConfig> {
    let mut configs: Vec<TxConfig> = device.legacy_modes().map(TxConfig::legacy).collect();
    if !device.has_mcs_support() {
        return configs;
    }

    let ht_gi = device.ht_guard_interval_ns();
    for mode in device.mcs_modes() {
        for width in widths_up_to(device.channel_width_mhz) {
            match mode.class() {
                ModulationClass::Ht => {
                    configs.push(TxConfig::new(mode, mode.ht_spatial_streams(), ht_gi, width));
                }
                ModulationClass::Vht => {
                    for nss in 1..=device.spatial_streams {
                        configs.push(TxConfig::new(mode, nss, ht_gi, width));
                    }
                }
                ModulationClass::He => {
                    for nss in 1..=device.spatial_streams {
                        configs.push(TxConfig::new(mode, nss, device.he_guard_interval_ns, width));
                    }
                }
                _ => {}
            }
        }
    }
    configs
}
