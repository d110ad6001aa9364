//! Manager facade: owns the selector and the station store and routes
//! feedback and selection requests to the right record.

use rateadapt_phy::{DeviceCapabilities, ErrorRateModel, PeerCapabilities, TxConfig};
use tracing::info;

use crate::config::IdealConfig;
use crate::error::IdealError;
use crate::feedback::{self, FeedbackEvent, FeedbackOutcome, FeedbackSink};
use crate::observer::RateObserver;
use crate::selector::RateSelector;
use crate::station::{MacAddress, StationHandle, StationRecord, StationStore};
use crate::thresholds::{ThresholdTable, DEFAULT_BER_THRESHOLD};

/// Ideal SNR-threshold rate manager for one local radio.
///
/// The manager is `Send` but not `Sync`: every call that touches a record
/// takes `&mut self`, so feedback and selection for a peer are serialised.
#[derive(Debug)]
pub struct IdealRateManager {
    selector: RateSelector,
    stations: StationStore,
}

impl IdealRateManager {
    /// Manager solving thresholds for the default 1e-5 bit error target.
    pub fn new(device: DeviceCapabilities, model: &dyn ErrorRateModel) -> Result<Self, IdealError> {
        Self::with_target(device, model, DEFAULT_BER_THRESHOLD)
    }

    pub fn with_target(
        device: DeviceCapabilities,
        model: &dyn ErrorRateModel,
        target_error: f64,
    ) -> Result<Self, IdealError> {
        Ok(IdealRateManager {
            selector: RateSelector::build(device, model, target_error)?,
            stations: StationStore::new(),
        })
    }

    pub fn from_config(config: &IdealConfig, model: &dyn ErrorRateModel) -> Result<Self, IdealError> {
        info!(
            standard = %config.device.standard,
            width = config.device.capabilities.channel_width_mhz,
            streams = config.device.capabilities.spatial_streams,
            "building ideal rate manager"
        );
        Self::with_target(config.device.capabilities.clone(), model, config.manager.ber_threshold)
    }

    pub fn subscribe(&mut self, observer: impl RateObserver + 'static) {
        self.selector.subscribe(Box::new(observer));
    }

    // ─── Peers ──────────────────────────────────────────────────────────

    /// Start tracking `address`. Registering a known address replaces its
    /// capabilities and returns the existing handle.
    pub fn register_peer(&mut self, address: MacAddress, capabilities: PeerCapabilities) -> StationHandle {
        let handle = self.stations.insert(address, capabilities);
        info!(peer = %address, handle = handle.0, "peer registered");
        handle
    }

    /// Replace a peer's capabilities. Returns `false` for an unknown handle.
    pub fn update_peer(&mut self, handle: StationHandle, capabilities: PeerCapabilities) -> bool {
        match self.stations.get_mut(handle) {
            Some(record) => {
                record.set_capabilities(capabilities);
                true
            }
            None => false,
        }
    }

    pub fn deregister_peer(&mut self, handle: StationHandle) -> Option<StationRecord> {
        let record = self.stations.remove(handle)?;
        info!(peer = %record.address(), "peer deregistered");
        Some(record)
    }

    pub fn handle_of(&self, address: &MacAddress) -> Option<StationHandle> {
        self.stations.handle_of(address)
    }

    pub fn station(&self, handle: StationHandle) -> Option<&StationRecord> {
        self.stations.get(handle)
    }

    pub fn stations(&self) -> &StationStore {
        &self.stations
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Data configuration for the peer, or `None` for an unknown handle.
    pub fn select_data_config(&mut self, handle: StationHandle) -> Option<TxConfig> {
        let record = self.stations.get_mut(handle)?;
        Some(self.selector.select_data_config(record))
    }

    /// RTS configuration for the peer, or `None` for an unknown handle.
    pub fn select_rts_config(&self, handle: StationHandle) -> Option<TxConfig> {
        let record = self.stations.get(handle)?;
        Some(self.selector.select_rts_config(record))
    }

    /// Apply a feedback event by handle.
    pub fn apply_event(&mut self, handle: StationHandle, event: FeedbackEvent) -> Option<FeedbackOutcome> {
        let record = self.stations.get_mut(handle)?;
        Some(feedback::apply(record, &event))
    }

    // ─── Introspection ──────────────────────────────────────────────────

    pub fn device(&self) -> &DeviceCapabilities {
        self.selector.device()
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        self.selector.thresholds()
    }

    pub fn default_config(&self) -> TxConfig {
        self.selector.default_config()
    }

    /// Selection never waits on asynchronous state.
    pub fn is_low_latency(&self) -> bool {
        true
    }
}

impl FeedbackSink for IdealRateManager {
    fn apply_feedback(&mut self, peer: MacAddress, event: FeedbackEvent) -> Option<FeedbackOutcome> {
        let handle = self.stations.handle_of(&peer)?;
        self.apply_event(handle, event)
    }
}
