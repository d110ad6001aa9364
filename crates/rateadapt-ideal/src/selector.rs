//! # Rate Selector
//!
//! Picks the data and RTS transmission configuration for a peer from its
//! last observed SNR.
//!
//! ## Data search
//!
//! Tiers are tried in a fixed order and the first that produces a candidate
//! wins. Applicability is exclusive down the list, so a pair that can both
//! speak HE never falls back to VHT or HT, only to legacy:
//!
//! | Order | Tier   | Applies when                                   |
//! |-------|--------|------------------------------------------------|
//! | 1     | HE     | device and peer HE                             |
//! | 2     | VHT    | HE does not apply, device and peer VHT         |
//! | 3     | HT     | neither above applies, device and peer HT      |
//! | 4     | Legacy | always                                         |
//!
//! Within a tier a configuration is eligible iff its threshold is strictly
//! below the observed SNR; the highest data rate wins and exact ties keep
//! the earlier candidate in catalog order.
//!
//! ## RTS search
//!
//! Only the device basic rate set is searched. The eligible mode with the
//! highest threshold (most robust rate that still clears the SNR) wins.

use rateadapt_phy::mode::{ModulationClass, Tier};
use rateadapt_phy::tx_config::{normalize_width, HE_GUARD_INTERVALS_NS};
use rateadapt_phy::{DeviceCapabilities, ErrorRateModel, PeerCapabilities, TransmissionMode, TxConfig};
use tracing::{debug, trace};

use crate::error::IdealError;
use crate::observer::{RateChange, RateObserver, RateObservers};
use crate::station::StationRecord;
use crate::thresholds::ThresholdTable;

/// Highest spatial-stream count any tier defines.
const MAX_SPATIAL_STREAMS: u8 = 8;

// ─── Tier Handlers ──────────────────────────────────────────────────────────

/// Best configuration a tier found for the current SNR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub config: TxConfig,
    pub data_rate: u64,
    pub threshold: f64,
}

struct TierHandler {
    tier: Tier,
    applies: fn(&DeviceCapabilities, &PeerCapabilities) -> bool,
}

fn both(device: &DeviceCapabilities, peer: &PeerCapabilities, tier: Tier) -> bool {
    device.supports(tier) && peer.supports(tier)
}

fn he_applies(device: &DeviceCapabilities, peer: &PeerCapabilities) -> bool {
    both(device, peer, Tier::He)
}

fn vht_applies(device: &DeviceCapabilities, peer: &PeerCapabilities) -> bool {
    !he_applies(device, peer) && both(device, peer, Tier::Vht)
}

fn ht_applies(device: &DeviceCapabilities, peer: &PeerCapabilities) -> bool {
    !he_applies(device, peer) && !vht_applies(device, peer) && both(device, peer, Tier::Ht)
}

fn legacy_applies(_: &DeviceCapabilities, _: &PeerCapabilities) -> bool {
    true
}

const TIER_ORDER: [TierHandler; 4] = [
    TierHandler { tier: Tier::He, applies: he_applies },
    TierHandler { tier: Tier::Vht, applies: vht_applies },
    TierHandler { tier: Tier::Ht, applies: ht_applies },
    TierHandler { tier: Tier::Legacy, applies: legacy_applies },
];

/// Operating parameters both ends can use.
#[derive(Debug, Clone, Copy)]
struct LinkParams {
    channel_width_mhz: u16,
    spatial_streams: u8,
    ht_guard_interval_ns: u16,
    he_guard_interval_ns: u16,
}

impl LinkParams {
    fn negotiate(device: &DeviceCapabilities, peer: &PeerCapabilities) -> Self {
        LinkParams {
            channel_width_mhz: normalize_width(peer.channel_width_mhz.min(device.channel_width_mhz)),
            spatial_streams: peer.spatial_streams.min(device.spatial_streams),
            ht_guard_interval_ns: peer.ht_guard_interval_ns().max(device.ht_guard_interval_ns()),
            he_guard_interval_ns: peer.he_guard_interval_ns.max(device.he_guard_interval_ns),
        }
    }
}

// ─── RateSelector ───────────────────────────────────────────────────────────

/// Stateless search over a shared threshold table; all per-peer state lives
/// in the [`StationRecord`] passed in.
pub struct RateSelector {
    device: DeviceCapabilities,
    thresholds: ThresholdTable,
    observers: RateObservers,
    default_config: TxConfig,
}

impl RateSelector {
    /// Validate `device` and solve its threshold table.
    pub fn build(
        device: DeviceCapabilities,
        model: &dyn ErrorRateModel,
        target_error: f64,
    ) -> Result<Self, IdealError> {
        validate_device(&device)?;
        let thresholds = ThresholdTable::build(&device, model, target_error)?;
        Ok(RateSelector {
            default_config: TxConfig::legacy(device.default_mode),
            device,
            thresholds,
            observers: RateObservers::new(),
        })
    }

    pub fn device(&self) -> &DeviceCapabilities {
        &self.device
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Configuration used when nothing clears the observed SNR.
    pub fn default_config(&self) -> TxConfig {
        self.default_config
    }

    pub fn subscribe(&mut self, observer: Box<dyn RateObserver>) {
        self.observers.subscribe(observer);
    }

    /// Data configuration for `record`, updating its cache and notifying
    /// observers when the chosen rate changes.
    pub fn select_data_config(&self, record: &mut StationRecord) -> TxConfig {
        if let Some(config) = record.cached_config() {
            record.stats.cache_hits += 1;
            trace!(peer = %record.address(), config = %config, "cached");
            return config;
        }
        record.stats.fresh_searches += 1;

        let peer = record.capabilities();
        let found = TIER_ORDER
            .iter()
            .filter(|handler| (handler.applies)(&self.device, peer))
            .find_map(|handler| {
                debug!(peer = %record.address(), tier = %handler.tier, "searching");
                self.search_tier(handler.tier, record)
            });

        let Some(best) = found else {
            record.stats.fallbacks += 1;
            debug!(
                peer = %record.address(),
                snr = record.last_snr_observed(),
                mode = %self.default_config.mode,
                "no eligible candidate, using default"
            );
            return self.default_config;
        };

        let old_rate = record.store_selection(best.config, best.data_rate);
        debug!(
            peer = %record.address(),
            mode = %best.config.mode,
            nss = best.config.nss,
            rate_bps = best.data_rate,
            threshold = best.threshold,
            snr = record.last_snr_observed(),
            "selected"
        );
        if old_rate != best.data_rate {
            record.stats.rate_changes += 1;
            self.observers.notify(&RateChange {
                peer: record.address(),
                old_rate_bps: old_rate,
                new_rate_bps: best.data_rate,
            });
        }
        best.config
    }

    /// RTS configuration for `record`. Reads nothing but the observed SNR
    /// and writes nothing.
    pub fn select_rts_config(&self, record: &StationRecord) -> TxConfig {
        let snr = record.last_snr_observed();
        let mut best: Option<(TxConfig, f64)> = None;
        for mode in &self.device.basic_modes {
            let config = TxConfig::legacy(*mode);
            let threshold = self.thresholds.threshold(&config);
            if threshold < snr && best.map_or(true, |(_, t)| threshold > t) {
                best = Some((config, threshold));
            }
        }
        match best {
            Some((config, threshold)) => {
                trace!(peer = %record.address(), mode = %config.mode, threshold, snr, "rts");
                config
            }
            None => self.default_config,
        }
    }

    fn search_tier(&self, tier: Tier, record: &StationRecord) -> Option<Candidate> {
        let peer = record.capabilities();
        let link = LinkParams::negotiate(&self.device, peer);
        let snr = record.last_snr_observed();

        let mut best: Option<Candidate> = None;
        for mode in self.tier_modes(tier, peer) {
            for config in configs_for(mode, &link) {
                if !config.is_valid() {
                    trace!(config = %config, "skipping invalid");
                    continue;
                }
                let threshold = self.thresholds.threshold(&config);
                let data_rate = config.data_rate();
                trace!(
                    peer = %record.address(),
                    mode = %mode,
                    rate_bps = data_rate,
                    threshold,
                    snr,
                    "testing"
                );
                if threshold < snr && best.map_or(true, |b| data_rate > b.data_rate) {
                    best = Some(Candidate {
                        config,
                        data_rate,
                        threshold,
                    });
                }
            }
        }
        best
    }

    /// Device catalog modes of `tier` that the peer also supports.
    fn tier_modes<'a>(
        &'a self,
        tier: Tier,
        peer: &'a PeerCapabilities,
    ) -> impl Iterator<Item = TransmissionMode> + 'a {
        self.device
            .modes
            .iter()
            .copied()
            .filter(move |m| m.tier() == tier && peer.supports_mode(m))
    }
}

impl std::fmt::Debug for RateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateSelector")
            .field("thresholds", &self.thresholds.len())
            .field("observers", &self.observers)
            .field("default_config", &self.default_config)
            .finish()
    }
}

/// Candidate configurations of `mode` over the negotiated link.
fn configs_for(mode: TransmissionMode, link: &LinkParams) -> Vec<TxConfig> {
    let width = link.channel_width_mhz;
    match mode.class() {
        ModulationClass::Ht => {
            let nss = mode.ht_spatial_streams();
            if nss > link.spatial_streams {
                return Vec::new();
            }
            vec![TxConfig::new(mode, nss, link.ht_guard_interval_ns, width)]
        }
        ModulationClass::Vht => (1..=link.spatial_streams)
            .map(|nss| TxConfig::new(mode, nss, link.ht_guard_interval_ns, width))
            .collect(),
        ModulationClass::He => (1..=link.spatial_streams)
            .map(|nss| TxConfig::new(mode, nss, link.he_guard_interval_ns, width))
            .collect(),
        _ => vec![TxConfig::legacy(mode)],
    }
}

/// Check the device descriptor before any threshold is solved.
pub fn validate_device(device: &DeviceCapabilities) -> Result<(), IdealError> {
    if device.modes.is_empty() {
        return Err(IdealError::EmptyCatalog);
    }
    let is_legacy_member =
        |m: &TransmissionMode| m.tier() == Tier::Legacy && device.modes.contains(m);
    if !is_legacy_member(&device.default_mode) {
        return Err(IdealError::InvalidDefaultMode(device.default_mode.name()));
    }
    if let Some(bad) = device.basic_modes.iter().find(|m| !is_legacy_member(*m)) {
        return Err(IdealError::InvalidBasicMode(bad.name()));
    }
    if let Some(mode) = device.modes.iter().find(|m| !device.supports(m.tier())) {
        return Err(IdealError::TierNotSupported {
            mode: mode.name(),
            tier: mode.tier(),
        });
    }
    if device.channel_width_mhz == 0
        || (device.has_mcs_support() && device.channel_width_mhz < 20)
    {
        return Err(IdealError::InvalidChannelWidth(device.channel_width_mhz));
    }
    if !(1..=MAX_SPATIAL_STREAMS).contains(&device.spatial_streams) {
        return Err(IdealError::InvalidSpatialStreams(device.spatial_streams));
    }
    if device.he && !HE_GUARD_INTERVALS_NS.contains(&device.he_guard_interval_ns) {
        return Err(IdealError::InvalidHeGuardInterval(device.he_guard_interval_ns));
    }
    Ok(())
}
