//! # Prometheus Metrics
//!
//! Renders per-station adaptation state in Prometheus text exposition
//! format, and as JSON for dashboards.

use std::fmt::Write;

use rateadapt_phy::tx_config::ratio_to_db;

use crate::station::{StationSnapshot, StationStore};

struct Metric {
    name: &'static str,
    help: &'static str,
    kind: &'static str,
    value: fn(&StationSnapshot) -> String,
}

const METRICS: &[Metric] = &[
    Metric {
        name: "rateadapt_station_snr_db",
        help: "Last observed SNR in dB.",
        kind: "gauge",
        value: |s| {
            if s.last_snr_observed > 0.0 {
                format!("{:.3}", ratio_to_db(s.last_snr_observed))
            } else {
                "NaN".to_string()
            }
        },
    },
    Metric {
        name: "rateadapt_station_data_rate_bps",
        help: "Data rate of the last fresh selection in bits per second.",
        kind: "gauge",
        value: |s| s.cached_data_rate_bps.to_string(),
    },
    Metric {
        name: "rateadapt_station_cache_valid",
        help: "Whether the cached configuration matches the observed SNR (1) or not (0).",
        kind: "gauge",
        value: |s| u8::from(s.cache_valid).to_string(),
    },
    Metric {
        name: "rateadapt_station_searches_total",
        help: "Data selections that ran a tier search.",
        kind: "counter",
        value: |s| s.stats.fresh_searches.to_string(),
    },
    Metric {
        name: "rateadapt_station_cache_hits_total",
        help: "Data selections answered from the cache.",
        kind: "counter",
        value: |s| s.stats.cache_hits.to_string(),
    },
    Metric {
        name: "rateadapt_station_fallbacks_total",
        help: "Searches that returned the default configuration.",
        kind: "counter",
        value: |s| s.stats.fallbacks.to_string(),
    },
    Metric {
        name: "rateadapt_station_rate_changes_total",
        help: "Rate-change notifications emitted.",
        kind: "counter",
        value: |s| s.stats.rate_changes.to_string(),
    },
    Metric {
        name: "rateadapt_station_discarded_reports_total",
        help: "SNR reports discarded as unusable.",
        kind: "counter",
        value: |s| s.stats.discarded_reports.to_string(),
    },
];

/// Render every station in `stations` as Prometheus text exposition format.
pub fn render_prometheus(stations: &StationStore) -> String {
    let snapshots = stations.snapshots();
    let mut out = String::with_capacity(256 + snapshots.len() * METRICS.len() * 64);

    let _ = writeln!(out, "# HELP rateadapt_stations Registered stations.");
    let _ = writeln!(out, "# TYPE rateadapt_stations gauge");
    let _ = writeln!(out, "rateadapt_stations {}", snapshots.len());

    for metric in METRICS {
        let _ = writeln!(out, "# HELP {} {}", metric.name, metric.help);
        let _ = writeln!(out, "# TYPE {} {}", metric.name, metric.kind);
        for snap in &snapshots {
            let _ = writeln!(
                out,
                "{}{{peer=\"{}\"}} {}",
                metric.name,
                snap.address,
                (metric.value)(snap)
            );
        }
    }

    // Mode as an info-style gauge so the label carries the name.
    let _ = writeln!(out, "# HELP rateadapt_station_mode Mode of the last fresh selection.");
    let _ = writeln!(out, "# TYPE rateadapt_station_mode gauge");
    for snap in &snapshots {
        if let Some(mode) = snap.cached_mode {
            let _ = writeln!(
                out,
                "rateadapt_station_mode{{peer=\"{}\",mode=\"{}\"}} 1",
                snap.address, mode
            );
        }
    }

    out
}

/// Station snapshots as a JSON array.
pub fn snapshot_json(stations: &StationStore) -> serde_json::Result<String> {
    serde_json::to_string(&stations.snapshots())
}
