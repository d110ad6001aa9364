//! End-to-end selection behavior through the manager facade.

mod common;

use common::*;
use rateadapt_ideal::selector::validate_device;
use rateadapt_ideal::{
    ChannelObserver, FeedbackEvent, FeedbackOutcome, FeedbackSink, IdealConfig, IdealRateManager,
    MacAddress, RateChange,
};
use rateadapt_phy::mode::{Tier, HE_MCS, OFDM_MODES, VHT_MCS};
use rateadapt_phy::{AwgnErrorRateModel, PeerCapabilities, TxConfig, WifiStandard};

const PEER: MacAddress = MacAddress([0x02, 0, 0, 0, 0, 0x10]);

// ─── Three-mode example ─────────────────────────────────────────────────────

#[test]
fn three_mode_example_at_snr_6_and_1() {
    init_tracing();
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());

    m.on_data_ok(PEER, 1.0, 6.0);
    assert_eq!(m.select_data_config(h).unwrap(), TxConfig::legacy(OFDM_MODES[1]));
    assert_eq!(m.select_rts_config(h).unwrap(), TxConfig::legacy(OFDM_MODES[1]));

    m.on_data_ok(PEER, 1.0, 1.0);
    let default = TxConfig::legacy(OFDM_MODES[0]);
    assert_eq!(m.default_config(), default);
    assert_eq!(m.select_data_config(h).unwrap(), default);
    assert_eq!(m.select_rts_config(h).unwrap(), default);
}

#[test]
fn rts_prefers_robust_rate_over_fast_one() {
    init_tracing();
    let mut m = three_mode_manager([2.0, 5.0, 4.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    m.on_data_ok(PEER, 1.0, 6.0);
    assert_eq!(m.select_data_config(h).unwrap().mode, OFDM_MODES[2]);
    assert_eq!(m.select_rts_config(h).unwrap().mode, OFDM_MODES[1]);
}

#[test]
fn data_search_ignores_rts_selection() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    m.on_rts_ok(PEER, 1.0, 10.0);
    for _ in 0..3 {
        m.select_rts_config(h);
    }
    let stats = *m.station(h).unwrap().stats();
    assert_eq!(stats.fresh_searches, 0);
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(m.select_data_config(h).unwrap().mode, OFDM_MODES[2]);
}

// ─── Cache ──────────────────────────────────────────────────────────────────

#[test]
fn cache_coherence_and_invalidation() {
    init_tracing();
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());

    m.on_data_ok(PEER, 1.0, 6.0);
    let first = m.select_data_config(h).unwrap();
    assert_eq!(m.select_data_config(h).unwrap(), first);
    assert_eq!(m.station(h).unwrap().stats().cache_hits, 1);

    // failures leave the cache alone
    m.on_data_failed(PEER);
    m.on_final_data_failed(PEER);
    m.on_rts_failed(PEER);
    m.on_final_rts_failed(PEER);
    m.on_rx_ok(PEER, 50.0);
    assert!(m.station(h).unwrap().is_cache_valid());

    // a new SNR forces a fresh search
    m.on_data_ok(PEER, 1.0, 10.0);
    assert!(!m.station(h).unwrap().is_cache_valid());
    assert_eq!(m.select_data_config(h).unwrap().mode, OFDM_MODES[2]);

    // and returning to the old SNR searches again rather than reusing
    m.on_data_ok(PEER, 1.0, 6.0);
    assert_eq!(m.select_data_config(h).unwrap(), first);
    assert_eq!(m.station(h).unwrap().stats().fresh_searches, 3);
}

#[test]
fn zero_data_snr_keeps_previous_measurement() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    m.on_data_ok(PEER, 1.0, 6.0);
    m.select_data_config(h);

    assert_eq!(m.on_data_ok(PEER, 1.0, 0.0), Some(FeedbackOutcome::Discarded));
    assert_eq!(
        m.on_aggregate_status(PEER, 10, 2, 1.0, 0.0),
        Some(FeedbackOutcome::Discarded)
    );
    assert_eq!(m.station(h).unwrap().last_snr_observed(), 6.0);
    assert!(m.station(h).unwrap().is_cache_valid());
    assert_eq!(m.station(h).unwrap().stats().discarded_reports, 2);
}

#[test]
fn aggregate_status_updates_like_data_ok() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    assert_eq!(
        m.on_aggregate_status(PEER, 10, 0, 1.0, 9.5),
        Some(FeedbackOutcome::Updated)
    );
    assert_eq!(m.select_data_config(h).unwrap().mode, OFDM_MODES[2]);
}

#[test]
fn queued_events_apply_in_order() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    let (tx, rx) = crossbeam_channel::unbounded();
    for event in [
        FeedbackEvent::DataOk { ack_snr: 1.0, data_snr: 10.0 },
        FeedbackEvent::DataFailed,
        FeedbackEvent::RtsOk { cts_snr: 1.0, rts_snr: 3.0 },
    ] {
        tx.send((PEER, event)).unwrap();
    }
    drop(tx);
    for (peer, event) in rx {
        m.apply_feedback(peer, event);
    }
    assert_eq!(m.station(h).unwrap().last_snr_observed(), 3.0);
    assert_eq!(m.select_data_config(h).unwrap().mode, OFDM_MODES[0]);
}

// ─── Fallback ───────────────────────────────────────────────────────────────

#[test]
fn fallback_is_deterministic_and_uncached() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    // no report yet: observed SNR is zero
    let a = m.select_data_config(h).unwrap();
    let b = m.select_data_config(h).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, m.default_config());
    let rec = m.station(h).unwrap();
    assert_eq!(rec.last_snr_used(), None);
    assert_eq!(rec.stats().fallbacks, 2);
    assert_eq!(rec.cached_data_rate(), 0);
}

#[test]
fn fallback_for_dsss_default_uses_22_mhz() {
    let dev = WifiStandard::Dot11g.device_capabilities();
    let mut m = IdealRateManager::new(dev.clone(), &AwgnErrorRateModel).unwrap();
    let h = m.register_peer(PEER, PeerCapabilities::matching(&dev));
    let cfg = m.select_data_config(h).unwrap();
    assert_eq!(cfg.channel_width_mhz, 22);
    assert_eq!(cfg.nss, 1);
    assert_eq!(cfg.guard_interval_ns, 800);
}

// ─── Tiers ──────────────────────────────────────────────────────────────────

#[test]
fn tier_precedence_on_ax_device() {
    init_tracing();
    let dev = WifiStandard::Dot11ax5Ghz.device_capabilities();
    let mut m = IdealRateManager::new(dev.clone(), &AwgnErrorRateModel).unwrap();

    let he_peer = m.register_peer(MacAddress::local(1), PeerCapabilities::matching(&dev));
    let vht_peer = m.register_peer(
        MacAddress::local(2),
        PeerCapabilities::matching(&WifiStandard::Dot11ac.device_capabilities()),
    );
    let ht_peer = m.register_peer(
        MacAddress::local(3),
        PeerCapabilities::matching(&WifiStandard::Dot11n5Ghz.device_capabilities()),
    );
    let legacy_peer = m.register_peer(
        MacAddress::local(4),
        PeerCapabilities::legacy(OFDM_MODES.to_vec()),
    );

    for n in 1..=4 {
        m.on_data_ok(MacAddress::local(n), 1.0, 1e5);
    }

    assert_eq!(m.select_data_config(he_peer).unwrap().mode.tier(), Tier::He);
    assert_eq!(m.select_data_config(vht_peer).unwrap().mode.tier(), Tier::Vht);
    assert_eq!(m.select_data_config(ht_peer).unwrap().mode.tier(), Tier::Ht);
    assert_eq!(m.select_data_config(legacy_peer).unwrap().mode, OFDM_MODES[7]);

    // RTS always goes out at a legacy basic rate
    for h in [he_peer, vht_peer, ht_peer, legacy_peer] {
        let rts = m.select_rts_config(h).unwrap();
        assert!(m.device().basic_modes.contains(&rts.mode));
    }
}

#[test]
fn negotiated_width_and_streams() {
    let mut dev = WifiStandard::Dot11ax5Ghz.device_capabilities();
    dev.spatial_streams = 2;
    dev.channel_width_mhz = 160;
    let mut m = IdealRateManager::new(dev.clone(), &AwgnErrorRateModel).unwrap();

    let mut peer = PeerCapabilities::matching(&dev);
    peer.channel_width_mhz = 80;
    peer.spatial_streams = 4;
    let h = m.register_peer(PEER, peer);
    m.on_data_ok(PEER, 1.0, 1e5);
    let cfg = m.select_data_config(h).unwrap();
    assert_eq!(cfg, TxConfig::new(HE_MCS[11], 2, 800, 80));
}

#[test]
fn peer_without_high_mcs_gets_best_it_supports() {
    let dev = WifiStandard::Dot11ac.device_capabilities();
    let mut m = IdealRateManager::new(dev.clone(), &AwgnErrorRateModel).unwrap();
    let mut peer = PeerCapabilities::matching(&dev);
    peer.modes.retain(|mode| !(mode.tier() == Tier::Vht && mode.mcs() > 7));
    let h = m.register_peer(PEER, peer);
    m.on_data_ok(PEER, 1.0, 1e5);
    assert_eq!(m.select_data_config(h).unwrap().mode, VHT_MCS[7]);
}

// ─── Observers ──────────────────────────────────────────────────────────────

#[test]
fn channel_observer_sees_rate_changes() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let (tx, rx) = crossbeam_channel::unbounded();
    m.subscribe(ChannelObserver::new(tx));
    let h = m.register_peer(PEER, three_mode_peer());

    for snr in [6.0, 6.5, 10.0, 3.0, 1.0] {
        m.on_data_ok(PEER, 1.0, snr);
        m.select_data_config(h);
    }

    let changes: Vec<RateChange> = rx.try_iter().collect();
    let rates: Vec<(u64, u64)> = changes
        .iter()
        .map(|c| (c.old_rate_bps, c.new_rate_bps))
        .collect();
    assert_eq!(
        rates,
        vec![
            (0, 9_000_000),
            (9_000_000, 12_000_000),
            (12_000_000, 6_000_000),
        ]
    );
    assert!(changes.iter().all(|c| c.peer == PEER));
}

// ─── Lifecycle & config ─────────────────────────────────────────────────────

#[test]
fn deregistered_peer_is_unknown() {
    let mut m = three_mode_manager([2.0, 5.0, 9.0]);
    let h = m.register_peer(PEER, three_mode_peer());
    let rec = m.deregister_peer(h).unwrap();
    assert_eq!(rec.address(), PEER);
    assert_eq!(m.handle_of(&PEER), None);
    assert_eq!(m.on_rts_ok(PEER, 1.0, 6.0), None);
    assert!(m.deregister_peer(h).is_none());
}

#[test]
fn manager_from_toml_config() {
    let cfg = IdealConfig::from_toml_str(
        r#"
[device]
standard = "802.11ac"
spatial_streams = 2
short_guard_interval = true
"#,
    )
    .unwrap();
    validate_device(&cfg.device.capabilities).unwrap();
    let mut m = IdealRateManager::from_config(&cfg, &AwgnErrorRateModel).unwrap();
    let dev = m.device().clone();
    let h = m.register_peer(PEER, PeerCapabilities::matching(&dev));
    m.on_data_ok(PEER, 1.0, 1e5);
    assert_eq!(m.select_data_config(h).unwrap(), TxConfig::new(VHT_MCS[9], 2, 400, 80));
}

#[test]
fn invalid_config_fails_at_construction() {
    let cfg = IdealConfig::from_toml_str("[device]\nstandard = \"802.11a\"\ndefault_mode = \"DsssRate1Mbps\"\n")
        .unwrap();
    assert!(IdealRateManager::from_config(&cfg, &AwgnErrorRateModel).is_err());
}
