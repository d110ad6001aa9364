//! # rateadapt-phy
//!
//! PHY-side vocabulary shared by the rate-adaptation algorithms.
//!
//! ## Crate structure
//!
//! - [`mode`]: Transmission-mode catalog (DSSS through HE MCS 11)
//! - [`tx_config`]: Complete TX configuration, validity rules, data rates
//! - [`capabilities`]: Local device and remote peer capability descriptors
//! - [`standard`]: Per-amendment device presets
//! - [`error_model`]: Error-rate models and the min-SNR solver

pub mod capabilities;
pub mod error_model;
pub mod mode;
pub mod standard;
pub mod tx_config;

pub use capabilities::{DeviceCapabilities, PeerCapabilities};
pub use error_model::{AwgnErrorRateModel, ErrorRateModel, StepErrorRateModel};
pub use mode::{ModulationClass, Tier, TransmissionMode};
pub use standard::WifiStandard;
pub use tx_config::TxConfig;
