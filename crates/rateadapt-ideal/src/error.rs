use rateadapt_phy::mode::Tier;
use rateadapt_phy::TxConfig;
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

/// Device or threshold-table configuration that cannot be used.
#[derive(Debug, Error)]
pub enum IdealError {
    #[error("device mode catalog is empty")]
    EmptyCatalog,

    #[error("default mode {0} is not a legacy mode in the device catalog")]
    InvalidDefaultMode(&'static str),

    #[error("basic mode {0} is not a legacy mode in the device catalog")]
    InvalidBasicMode(&'static str),

    #[error("catalog contains {mode} but the device does not enable {tier}")]
    TierNotSupported { mode: &'static str, tier: Tier },

    #[error("unsupported channel width {0} MHz")]
    InvalidChannelWidth(u16),

    #[error("spatial stream count must be 1..=8, got {0}")]
    InvalidSpatialStreams(u8),

    #[error("unsupported HE guard interval {0} ns")]
    InvalidHeGuardInterval(u16),

    #[error("target error probability must be in (0, 1), got {0}")]
    InvalidTarget(f64),

    #[error("error model has no finite SNR threshold for {config}")]
    UnreachableThreshold { config: TxConfig },
}

/// Problems turning a TOML document into a [`crate::config::IdealConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown Wi-Fi standard {0:?}")]
    UnknownStandard(String),

    #[error("unknown transmission mode {0:?}")]
    UnknownMode(String),

    #[error("{0} is not a legacy mode")]
    NotLegacyMode(String),

    #[error("ber_threshold must be in (0, 1), got {0}")]
    InvalidBerThreshold(f64),
}

#[derive(Debug, Error)]
#[error("invalid MAC address {0:?}")]
pub struct ParseMacError(pub String);
