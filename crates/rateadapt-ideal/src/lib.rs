//! # rateadapt-ideal
//!
//! "Ideal" rate adaptation: the receiver's SNR for each peer is assumed to
//! be known at the transmitter. For every frame the manager picks the fastest
//! configuration whose precomputed SNR threshold lies below the last observed
//! SNR, caching the choice until the SNR changes.
//!
//! ## Crate structure
//!
//! - [`thresholds`]: Minimum-SNR table solved once from the error model
//! - [`station`]: Per-peer records in a slab arena
//! - [`selector`]: Tiered data search and RTS search
//! - [`feedback`]: MAC feedback events and how they update a record
//! - [`observer`]: Rate-change notifications
//! - [`manager`]: Facade tying the above together
//! - [`config`]: TOML configuration
//! - [`metrics`]: Prometheus and JSON rendering
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod feedback;
pub mod manager;
pub mod metrics;
pub mod observer;
pub mod selector;
pub mod station;
pub mod thresholds;

pub use config::IdealConfig;
pub use error::{ConfigError, IdealError};
pub use feedback::{FeedbackEvent, FeedbackOutcome, FeedbackSink};
pub use manager::IdealRateManager;
pub use observer::{ChannelObserver, RateChange, RateObserver};
pub use station::{MacAddress, StationHandle};
