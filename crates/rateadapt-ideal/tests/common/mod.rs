#![allow(dead_code)]

use rateadapt_ideal::IdealRateManager;
use rateadapt_phy::mode::OFDM_MODES;
use rateadapt_phy::{DeviceCapabilities, PeerCapabilities, StepErrorRateModel};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness. Set `RUST_LOG=debug` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 6, 9 and 12 Mb/s OFDM device whose basic set is all three.
pub fn three_mode_device() -> DeviceCapabilities {
    let mut dev = DeviceCapabilities::legacy(OFDM_MODES[..3].to_vec());
    dev.basic_modes = OFDM_MODES[..3].to_vec();
    dev
}

/// Step model with the given thresholds for 6, 9 and 12 Mb/s.
pub fn three_mode_model(thresholds: [f64; 3]) -> StepErrorRateModel {
    OFDM_MODES[..3]
        .iter()
        .zip(thresholds)
        .fold(StepErrorRateModel::new(), |model, (mode, t)| model.with_threshold(*mode, t))
}

pub fn three_mode_manager(thresholds: [f64; 3]) -> IdealRateManager {
    IdealRateManager::new(three_mode_device(), &three_mode_model(thresholds))
        .expect("three-mode device is valid")
}

pub fn three_mode_peer() -> PeerCapabilities {
    PeerCapabilities::legacy(OFDM_MODES[..3].to_vec())
}
