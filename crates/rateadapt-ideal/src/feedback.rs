//! # Feedback
//!
//! Transmission outcomes reported by the MAC. Only three reports carry an
//! SNR the algorithm uses:
//!
//! | Event              | Effect on `last_snr_observed`                 |
//! |--------------------|-----------------------------------------------|
//! | `RtsOk`            | set to `rts_snr`, unconditionally             |
//! | `DataOk`           | set to `data_snr` unless it is not positive   |
//! | `AggregateStatus`  | same rule as `DataOk`                         |
//! | everything else    | none                                          |
//!
//! A `data_snr` of zero is how the MAC signals "not measured"; negative,
//! NaN and infinite values are treated the same way.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::station::{MacAddress, StationRecord};

/// One report from the MAC about a peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedbackEvent {
    RxOk { rx_snr: f64 },
    RtsOk { cts_snr: f64, rts_snr: f64 },
    DataOk { ack_snr: f64, data_snr: f64 },
    AggregateStatus {
        n_success: u16,
        n_failed: u16,
        rx_snr: f64,
        data_snr: f64,
    },
    RtsFailed,
    DataFailed,
    FinalRtsFailed,
    FinalDataFailed,
}

/// What applying an event did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// `last_snr_observed` was replaced.
    Updated,
    /// The event carried an SNR but it was unusable.
    Discarded,
    /// The event carries nothing the algorithm uses.
    Ignored,
}

/// Whether a reported data SNR is a usable measurement.
pub fn is_valid_data_snr(snr: f64) -> bool {
    snr.is_finite() && snr > 0.0
}

/// Apply `event` to `record`.
pub fn apply(record: &mut StationRecord, event: &FeedbackEvent) -> FeedbackOutcome {
    match *event {
        FeedbackEvent::RtsOk { rts_snr, .. } => {
            observe(record, rts_snr);
            FeedbackOutcome::Updated
        }
        FeedbackEvent::DataOk { data_snr, .. } | FeedbackEvent::AggregateStatus { data_snr, .. } => {
            if is_valid_data_snr(data_snr) {
                observe(record, data_snr);
                FeedbackOutcome::Updated
            } else {
                record.stats.discarded_reports += 1;
                warn!(peer = %record.address(), snr = data_snr, "discarding unusable data SNR");
                FeedbackOutcome::Discarded
            }
        }
        FeedbackEvent::RxOk { .. }
        | FeedbackEvent::RtsFailed
        | FeedbackEvent::DataFailed
        | FeedbackEvent::FinalRtsFailed
        | FeedbackEvent::FinalDataFailed => FeedbackOutcome::Ignored,
    }
}

fn observe(record: &mut StationRecord, snr: f64) {
    trace!(peer = %record.address(), snr, "snr observed");
    record.last_snr_observed = snr;
    record.stats.snr_updates += 1;
}

/// Receiver of MAC feedback, addressed by peer.
///
/// Implementors provide [`apply_feedback`](Self::apply_feedback); the
/// per-event methods wrap it. Unknown peers yield `None`.
pub trait FeedbackSink {
    fn apply_feedback(&mut self, peer: MacAddress, event: FeedbackEvent) -> Option<FeedbackOutcome>;

    fn on_rx_ok(&mut self, peer: MacAddress, rx_snr: f64) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::RxOk { rx_snr })
    }

    fn on_rts_ok(&mut self, peer: MacAddress, cts_snr: f64, rts_snr: f64) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::RtsOk { cts_snr, rts_snr })
    }

    fn on_data_ok(&mut self, peer: MacAddress, ack_snr: f64, data_snr: f64) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::DataOk { ack_snr, data_snr })
    }

    fn on_aggregate_status(
        &mut self,
        peer: MacAddress,
        n_success: u16,
        n_failed: u16,
        rx_snr: f64,
        data_snr: f64,
    ) -> Option<FeedbackOutcome> {
        self.apply_feedback(
            peer,
            FeedbackEvent::AggregateStatus {
                n_success,
                n_failed,
                rx_snr,
                data_snr,
            },
        )
    }

    fn on_rts_failed(&mut self, peer: MacAddress) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::RtsFailed)
    }

    fn on_data_failed(&mut self, peer: MacAddress) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::DataFailed)
    }

    fn on_final_rts_failed(&mut self, peer: MacAddress) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::FinalRtsFailed)
    }

    fn on_final_data_failed(&mut self, peer: MacAddress) -> Option<FeedbackOutcome> {
        self.apply_feedback(peer, FeedbackEvent::FinalDataFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rateadapt_phy::mode::OFDM_MODES;
    use rateadapt_phy::PeerCapabilities;

    fn record() -> StationRecord {
        StationRecord::new(MacAddress::local(1), PeerCapabilities::legacy(OFDM_MODES.to_vec()))
    }

    #[test]
    fn data_ok_updates_observed() {
        let mut rec = record();
        let out = apply(&mut rec, &FeedbackEvent::DataOk { ack_snr: 3.0, data_snr: 6.0 });
        assert_eq!(out, FeedbackOutcome::Updated);
        assert_eq!(rec.last_snr_observed(), 6.0);
        assert_eq!(rec.stats().snr_updates, 1);
    }

    #[test]
    fn unusable_data_snr_is_discarded() {
        let mut rec = record();
        apply(&mut rec, &FeedbackEvent::DataOk { ack_snr: 1.0, data_snr: 6.0 });
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let out = apply(&mut rec, &FeedbackEvent::DataOk { ack_snr: 1.0, data_snr: bad });
            assert_eq!(out, FeedbackOutcome::Discarded);
            let out = apply(
                &mut rec,
                &FeedbackEvent::AggregateStatus {
                    n_success: 3,
                    n_failed: 1,
                    rx_snr: 1.0,
                    data_snr: bad,
                },
            );
            assert_eq!(out, FeedbackOutcome::Discarded);
        }
        assert_eq!(rec.last_snr_observed(), 6.0);
        assert_eq!(rec.stats().discarded_reports, 8);
    }

    #[test]
    fn rts_ok_is_unconditional() {
        let mut rec = record();
        apply(&mut rec, &FeedbackEvent::DataOk { ack_snr: 1.0, data_snr: 6.0 });
        assert_eq!(
            apply(&mut rec, &FeedbackEvent::RtsOk { cts_snr: 1.0, rts_snr: 0.0 }),
            FeedbackOutcome::Updated
        );
        assert_eq!(rec.last_snr_observed(), 0.0);
    }

    #[test]
    fn failures_and_rx_change_nothing() {
        let mut rec = record();
        apply(&mut rec, &FeedbackEvent::DataOk { ack_snr: 1.0, data_snr: 6.0 });
        for event in [
            FeedbackEvent::RxOk { rx_snr: 42.0 },
            FeedbackEvent::RtsFailed,
            FeedbackEvent::DataFailed,
            FeedbackEvent::FinalRtsFailed,
            FeedbackEvent::FinalDataFailed,
        ] {
            assert_eq!(apply(&mut rec, &event), FeedbackOutcome::Ignored);
        }
        assert_eq!(rec.last_snr_observed(), 6.0);
    }

    #[test]
    fn events_deserialize_from_json() {
        let event: FeedbackEvent =
            serde_json::from_str(r#"{"event":"data_ok","ack_snr":2.0,"data_snr":8.5}"#).unwrap();
        assert_eq!(event, FeedbackEvent::DataOk { ack_snr: 2.0, data_snr: 8.5 });
        let event: FeedbackEvent = serde_json::from_str(r#"{"event":"final_rts_failed"}"#).unwrap();
        assert_eq!(event, FeedbackEvent::FinalRtsFailed);
    }
}
