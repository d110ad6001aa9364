//! # Error-Rate Models
//!
//! The rate manager treats the PHY's error model as an opaque function: it
//! only ever asks "what is the smallest SNR at which this configuration meets
//! a target error probability?". SNR values are linear power ratios.
//!
//! Two models are provided:
//! - [`AwgnErrorRateModel`]: closed-form uncoded BER of the constellation
//!   over AWGN, shifted by a nominal coding gain per code rate (and by the
//!   spreading gain for DSSS/CCK).
//! - [`StepErrorRateModel`]: every mode has a hard SNR threshold; below it
//!   nothing gets through, at or above it everything does.

use std::collections::HashMap;

use crate::mode::{CodeRate, ModulationClass, TransmissionMode};
use crate::tx_config::TxConfig;

/// Lower and upper bounds of the SNR search, as log10 of the linear ratio.
const SEARCH_LOG10_MIN: f64 = -10.0;
const SEARCH_LOG10_MAX: f64 = 10.0;
/// Bisection stops once the bracket is narrower than this (log10 units).
const SEARCH_PRECISION: f64 = 1e-12;
const SEARCH_MAX_STEPS: usize = 200;

/// DSSS chip rate (11 Mchip/s) used for the spreading gain.
const DSSS_CHIP_RATE: f64 = 11_000_000.0;

/// PHY error model consulted while building SNR thresholds.
pub trait ErrorRateModel {
    /// Probability that `nbits` sent with `config` at linear `snr` all arrive intact.
    fn chunk_success_rate(&self, config: &TxConfig, snr: f64, nbits: u64) -> f64;

    /// Smallest linear SNR at which the per-bit error probability of `config`
    /// does not exceed `target_error`, or `None` if no finite SNR gets there.
    fn min_snr(&self, config: &TxConfig, target_error: f64) -> Option<f64> {
        bisect_min_snr(|snr| 1.0 - self.chunk_success_rate(config, snr, 1), target_error)
    }
}

/// Invert a monotonically decreasing error curve by bisection over
/// `10^-10 ..= 10^10` on a logarithmic axis.
pub fn bisect_min_snr(error_at: impl Fn(f64) -> f64, target_error: f64) -> Option<f64> {
    let mut lo = SEARCH_LOG10_MIN;
    let mut hi = SEARCH_LOG10_MAX;

    if !(error_at(10f64.powf(hi)) <= target_error) {
        // Includes NaN from a broken model.
        return None;
    }
    if error_at(10f64.powf(lo)) <= target_error {
        return Some(10f64.powf(lo));
    }

    for _ in 0..SEARCH_MAX_STEPS {
        if hi - lo < SEARCH_PRECISION {
            break;
        }
        let mid = lo + (hi - lo) / 2.0;
        if error_at(10f64.powf(mid)) > target_error {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(10f64.powf(hi))
}

// ─── AWGN Approximation ─────────────────────────────────────────────────────

/// Uncoded-BER-plus-coding-gain approximation over an AWGN channel.
///
/// Ignores stream count and channel width: the reported SNR is already per
/// stream and per subcarrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwgnErrorRateModel;

impl AwgnErrorRateModel {
    /// Bit error rate of `mode` at linear `snr`.
    pub fn bit_error_rate(&self, mode: &TransmissionMode, snr: f64) -> f64 {
        if !(snr > 0.0) {
            return 0.5;
        }
        let ber = match mode.class() {
            ModulationClass::Dsss | ModulationClass::HrDsss => {
                // Eb/N0 gains the ratio of chip rate to bit rate.
                let bit_rate = mode.data_rate(22, 800, 1).max(1) as f64;
                let eb_n0 = snr * DSSS_CHIP_RATE / bit_rate;
                q_function((2.0 * eb_n0).sqrt())
            }
            _ => {
                let effective = snr * 10f64.powf(coding_gain_db(mode.code_rate()) / 10.0);
                qam_ber(mode.constellation(), effective)
            }
        };
        ber.clamp(0.0, 0.5)
    }
}

impl ErrorRateModel for AwgnErrorRateModel {
    fn chunk_success_rate(&self, config: &TxConfig, snr: f64, nbits: u64) -> f64 {
        let ber = self.bit_error_rate(&config.mode, snr);
        (1.0 - ber).powf(nbits as f64)
    }
}

/// Nominal soft-decision coding gain of the BCC/LDPC code at each rate.
fn coding_gain_db(rate: CodeRate) -> f64 {
    match rate {
        CodeRate::Undefined => 0.0,
        CodeRate::Half => 5.5,
        CodeRate::TwoThirds => 4.5,
        CodeRate::ThreeQuarters => 4.0,
        CodeRate::FiveSixths => 3.5,
    }
}

/// Gray-coded M-ary BER at symbol SNR `es_n0`.
fn qam_ber(constellation: u16, es_n0: f64) -> f64 {
    match constellation {
        0..=2 => q_function((2.0 * es_n0).sqrt()),
        4 => q_function(es_n0.sqrt()),
        m => {
            let m = f64::from(m);
            let k = m.log2();
            (4.0 / k) * (1.0 - 1.0 / m.sqrt()) * q_function((3.0 * es_n0 / (m - 1.0)).sqrt())
        }
    }
}

/// Gaussian tail probability Q(x).
fn q_function(x: f64) -> f64 {
    0.5 * erfc(x / std::f64::consts::SQRT_2)
}

/// Complementary error function (Abramowitz & Stegun 7.1.26).
fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    poly * (-x * x).exp()
}

// ─── Step Model ─────────────────────────────────────────────────────────────

/// Hard per-mode SNR thresholds.
///
/// Useful when thresholds come from measurement rather than theory. The
/// target error passed to [`ErrorRateModel::min_snr`] is ignored; a mode
/// without a configured threshold never succeeds.
#[derive(Debug, Clone, Default)]
pub struct StepErrorRateModel {
    thresholds: HashMap<&'static str, f64>,
}

impl StepErrorRateModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold for `mode` (builder style).
    pub fn with_threshold(mut self, mode: TransmissionMode, snr: f64) -> Self {
        self.set_threshold(mode, snr);
        self
    }

    pub fn set_threshold(&mut self, mode: TransmissionMode, snr: f64) {
        self.thresholds.insert(mode.name(), snr);
    }

    pub fn threshold(&self, mode: &TransmissionMode) -> Option<f64> {
        self.thresholds.get(mode.name()).copied()
    }
}

impl ErrorRateModel for StepErrorRateModel {
    fn chunk_success_rate(&self, config: &TxConfig, snr: f64, _nbits: u64) -> f64 {
        match self.threshold(&config.mode) {
            Some(t) if snr >= t => 1.0,
            _ => 0.0,
        }
    }

    fn min_snr(&self, config: &TxConfig, _target_error: f64) -> Option<f64> {
        self.threshold(&config.mode)
    }
}
