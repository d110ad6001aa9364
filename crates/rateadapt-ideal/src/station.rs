//! # Station Records
//!
//! Per-peer adaptation state kept in a slab arena. Records are created on
//! registration, mutated by feedback and by the selector, and dropped on
//! deregistration. Nothing outside the store holds on to a record; callers
//! address peers by [`StationHandle`] or by [`MacAddress`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rateadapt_phy::{PeerCapabilities, TxConfig};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use slab::Slab;

use crate::error::ParseMacError;

// ─── MacAddress ─────────────────────────────────────────────────────────────

/// 48-bit IEEE 802 address of a remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Address whose last byte is `n`, in the locally administered range.
    pub fn local(n: u8) -> Self {
        MacAddress([0x02, 0, 0, 0, 0, n])
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.trim().split([':', '-']);
        for byte in out.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseMacError(s.to_string()))?;
            if part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }
        Ok(MacAddress(out))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ─── StationRecord ──────────────────────────────────────────────────────────

/// Handle to a station in the store. May be reused after deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationHandle(pub usize);

/// Per-station counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationStats {
    /// Data selections that ran a tier search.
    pub fresh_searches: u64,
    /// Data selections answered from the cache.
    pub cache_hits: u64,
    /// Searches that found nothing and returned the default configuration.
    pub fallbacks: u64,
    /// Rate-change notifications emitted.
    pub rate_changes: u64,
    /// SNR reports accepted into `last_snr_observed`.
    pub snr_updates: u64,
    /// SNR reports rejected as invalid.
    pub discarded_reports: u64,
}

/// Adaptation state for one peer.
#[derive(Debug, Clone)]
pub struct StationRecord {
    address: MacAddress,
    capabilities: PeerCapabilities,
    /// Most recent accepted SNR report (linear). Zero until the first one.
    pub(crate) last_snr_observed: f64,
    /// SNR the cached configuration was chosen for.
    pub(crate) last_snr_used: Option<f64>,
    pub(crate) cached_config: Option<TxConfig>,
    /// Rate of the last successful search; 0 before the first.
    pub(crate) cached_data_rate: u64,
    pub(crate) stats: StationStats,
}

impl StationRecord {
    pub fn new(address: MacAddress, capabilities: PeerCapabilities) -> Self {
        StationRecord {
            address,
            capabilities,
            last_snr_observed: 0.0,
            last_snr_used: None,
            cached_config: None,
            cached_data_rate: 0,
            stats: StationStats::default(),
        }
    }

    pub fn address(&self) -> MacAddress {
        self.address
    }

    pub fn capabilities(&self) -> &PeerCapabilities {
        &self.capabilities
    }

    /// Replace the advertised capabilities. Drops the cached choice.
    pub fn set_capabilities(&mut self, capabilities: PeerCapabilities) {
        self.capabilities = capabilities;
        self.invalidate_cache();
    }

    pub fn last_snr_observed(&self) -> f64 {
        self.last_snr_observed
    }

    pub fn last_snr_used(&self) -> Option<f64> {
        self.last_snr_used
    }

    pub fn cached_data_rate(&self) -> u64 {
        self.cached_data_rate
    }

    /// The cached configuration is reusable iff it was chosen for exactly
    /// the SNR observed now.
    pub fn is_cache_valid(&self) -> bool {
        self.cached_config.is_some() && self.last_snr_used == Some(self.last_snr_observed)
    }

    /// Cached configuration, only while it is still valid.
    pub fn cached_config(&self) -> Option<TxConfig> {
        if self.is_cache_valid() {
            self.cached_config
        } else {
            None
        }
    }

    pub fn invalidate_cache(&mut self) {
        self.last_snr_used = None;
    }

    pub fn stats(&self) -> &StationStats {
        &self.stats
    }

    /// Store the outcome of a fresh search. Returns the previous rate.
    pub(crate) fn store_selection(&mut self, config: TxConfig, data_rate: u64) -> u64 {
        self.last_snr_used = Some(self.last_snr_observed);
        self.cached_config = Some(config);
        std::mem::replace(&mut self.cached_data_rate, data_rate)
    }

    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            address: self.address,
            last_snr_observed: self.last_snr_observed,
            cached_mode: self.cached_config.map(|c| c.mode.name()),
            cached_config: self.cached_config,
            cached_data_rate_bps: self.cached_data_rate,
            cache_valid: self.is_cache_valid(),
            stats: self.stats,
        }
    }
}

/// Serializable view of one station, for dashboards and logs.
#[derive(Debug, Clone, Serialize)]
pub struct StationSnapshot {
    pub address: MacAddress,
    pub last_snr_observed: f64,
    pub cached_mode: Option<&'static str>,
    pub cached_config: Option<TxConfig>,
    pub cached_data_rate_bps: u64,
    pub cache_valid: bool,
    pub stats: StationStats,
}

// ─── StationStore ───────────────────────────────────────────────────────────

/// Slab of station records with an address index.
#[derive(Debug, Default)]
pub struct StationStore {
    records: Slab<StationRecord>,
    by_address: HashMap<MacAddress, StationHandle>,
}

impl StationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `address`; re-registering replaces its capabilities and
    /// keeps the handle.
    pub fn insert(&mut self, address: MacAddress, capabilities: PeerCapabilities) -> StationHandle {
        if let Some(&handle) = self.by_address.get(&address) {
            if let Some(record) = self.records.get_mut(handle.0) {
                record.set_capabilities(capabilities);
                return handle;
            }
        }
        let handle = StationHandle(self.records.insert(StationRecord::new(address, capabilities)));
        self.by_address.insert(address, handle);
        handle
    }

    pub fn get(&self, handle: StationHandle) -> Option<&StationRecord> {
        self.records.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: StationHandle) -> Option<&mut StationRecord> {
        self.records.get_mut(handle.0)
    }

    pub fn handle_of(&self, address: &MacAddress) -> Option<StationHandle> {
        self.by_address.get(address).copied()
    }

    pub fn remove(&mut self, handle: StationHandle) -> Option<StationRecord> {
        let record = self.records.try_remove(handle.0)?;
        self.by_address.remove(&record.address);
        Some(record)
    }

    pub fn contains(&self, handle: StationHandle) -> bool {
        self.records.contains(handle.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StationHandle, &StationRecord)> {
        self.records.iter().map(|(k, v)| (StationHandle(k), v))
    }

    /// Snapshots of every station, ordered by address.
    pub fn snapshots(&self) -> Vec<StationSnapshot> {
        let mut out: Vec<StationSnapshot> = self.records.iter().map(|(_, r)| r.snapshot()).collect();
        out.sort_by_key(|s| s.address);
        out
    }
}
