//! # Transmission Modes
//!
//! Immutable descriptors for every physical-layer modulation/coding scheme
//! the rate manager can choose from, and the nominal data rate each one
//! achieves for a given channel width, guard interval and stream count.
//!
//! | Class    | Tier   | Rates / MCS                         |
//! |----------|--------|-------------------------------------|
//! | DSSS     | Legacy | 1, 2 Mb/s                           |
//! | HR/DSSS  | Legacy | 5.5, 11 Mb/s (CCK)                  |
//! | ERP-OFDM | Legacy | 6–54 Mb/s (2.4 GHz)                 |
//! | OFDM     | Legacy | 6–54 Mb/s (5 GHz)                   |
//! | HT       | HT     | MCS 0–31, NSS derived from the MCS  |
//! | VHT      | VHT    | MCS 0–9, NSS 1–8                    |
//! | HE       | HE     | MCS 0–11, NSS 1–8                   |

use serde::Serialize;
use std::fmt;

// ─── Classes & Tiers ────────────────────────────────────────────────────────

/// Modulation class of a transmission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModulationClass {
    Dsss,
    HrDsss,
    ErpOfdm,
    Ofdm,
    Ht,
    Vht,
    He,
}

impl ModulationClass {
    /// Capability generation this class belongs to.
    pub const fn tier(self) -> Tier {
        match self {
            ModulationClass::Dsss
            | ModulationClass::HrDsss
            | ModulationClass::ErpOfdm
            | ModulationClass::Ofdm => Tier::Legacy,
            ModulationClass::Ht => Tier::Ht,
            ModulationClass::Vht => Tier::Vht,
            ModulationClass::He => Tier::He,
        }
    }
}

/// Capability generation. Ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Tier {
    Legacy,
    Ht,
    Vht,
    He,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Legacy => write!(f, "legacy"),
            Tier::Ht => write!(f, "ht"),
            Tier::Vht => write!(f, "vht"),
            Tier::He => write!(f, "he"),
        }
    }
}

/// Convolutional / LDPC code rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CodeRate {
    /// DSSS and CCK carry no outer code.
    Undefined,
    Half,
    TwoThirds,
    ThreeQuarters,
    FiveSixths,
}

impl CodeRate {
    /// Rate as an exact `(numerator, denominator)` pair.
    pub const fn ratio(self) -> (u64, u64) {
        match self {
            CodeRate::Undefined => (1, 1),
            CodeRate::Half => (1, 2),
            CodeRate::TwoThirds => (2, 3),
            CodeRate::ThreeQuarters => (3, 4),
            CodeRate::FiveSixths => (5, 6),
        }
    }

    pub fn value(self) -> f64 {
        let (num, den) = self.ratio();
        num as f64 / den as f64
    }
}

// ─── TransmissionMode ───────────────────────────────────────────────────────

/// A physical-layer modulation/coding scheme.
///
/// Two modes are the same mode iff every field matches; the `name` alone is
/// unique within the catalogs below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransmissionMode {
    name: &'static str,
    class: ModulationClass,
    /// MCS index for HT/VHT/HE, position in the rate list otherwise.
    mcs: u8,
    /// Constellation size (2 = BPSK/DBPSK ... 1024 = 1024-QAM).
    constellation: u16,
    code_rate: CodeRate,
    /// Nominal rate at the reference width for DSSS/HR-DSSS/OFDM. Zero for MCS modes.
    fixed_rate_bps: u64,
}

impl TransmissionMode {
    const fn legacy(
        name: &'static str,
        class: ModulationClass,
        index: u8,
        constellation: u16,
        code_rate: CodeRate,
        fixed_rate_bps: u64,
    ) -> Self {
        TransmissionMode {
            name,
            class,
            mcs: index,
            constellation,
            code_rate,
            fixed_rate_bps,
        }
    }

    const fn scheme(name: &'static str, class: ModulationClass, mcs: u8) -> Self {
        // HT repeats the 8 base schemes once per extra spatial stream.
        let base = match class {
            ModulationClass::Ht => mcs % 8,
            _ => mcs,
        };
        let (constellation, code_rate) = match base {
            0 => (2, CodeRate::Half),
            1 => (4, CodeRate::Half),
            2 => (4, CodeRate::ThreeQuarters),
            3 => (16, CodeRate::Half),
            4 => (16, CodeRate::ThreeQuarters),
            5 => (64, CodeRate::TwoThirds),
            6 => (64, CodeRate::ThreeQuarters),
            7 => (64, CodeRate::FiveSixths),
            8 => (256, CodeRate::ThreeQuarters),
            9 => (256, CodeRate::FiveSixths),
            10 => (1024, CodeRate::ThreeQuarters),
            _ => (1024, CodeRate::FiveSixths),
        };
        TransmissionMode {
            name,
            class,
            mcs,
            constellation,
            code_rate,
            fixed_rate_bps: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn class(&self) -> ModulationClass {
        self.class
    }

    pub fn tier(&self) -> Tier {
        self.class.tier()
    }

    pub fn mcs(&self) -> u8 {
        self.mcs
    }

    pub fn constellation(&self) -> u16 {
        self.constellation
    }

    pub fn code_rate(&self) -> CodeRate {
        self.code_rate
    }

    /// Coded bits carried per subcarrier symbol (log2 of the constellation size).
    pub fn bits_per_symbol(&self) -> u32 {
        u32::from(self.constellation).trailing_zeros()
    }

    /// Whether this is an HT/VHT/HE MCS rather than a legacy rate.
    pub fn is_mcs(&self) -> bool {
        self.tier() != Tier::Legacy
    }

    /// Spatial streams implied by an HT MCS index. Other classes report 1.
    pub fn ht_spatial_streams(&self) -> u8 {
        match self.class {
            ModulationClass::Ht => self.mcs / 8 + 1,
            _ => 1,
        }
    }

    /// Channel width class a legacy mode is always sent at: 22 MHz for
    /// DSSS/HR-DSSS, 20 MHz for everything else.
    pub fn width_class_mhz(&self) -> u16 {
        match self.class {
            ModulationClass::Dsss | ModulationClass::HrDsss => 22,
            _ => 20,
        }
    }

    /// Nominal PHY data rate in bits per second.
    ///
    /// Returns 0 for a width the class has no subcarrier plan for.
    pub fn data_rate(&self, channel_width_mhz: u16, guard_interval_ns: u16, nss: u8) -> u64 {
        match self.class {
            ModulationClass::Dsss | ModulationClass::HrDsss => self.fixed_rate_bps,
            ModulationClass::Ofdm | ModulationClass::ErpOfdm => {
                // Half- and quarter-clocked OFDM scale linearly with width.
                self.fixed_rate_bps * u64::from(channel_width_mhz.min(20)) / 20
            }
            ModulationClass::Ht | ModulationClass::Vht | ModulationClass::He => {
                let subcarriers = data_subcarriers(self.class, channel_width_mhz);
                let symbol_ns = symbol_duration_ns(self.class, guard_interval_ns);
                let (num, den) = self.code_rate.ratio();
                let coded_bits = subcarriers
                    * u64::from(self.bits_per_symbol())
                    * u64::from(nss)
                    * num;
                coded_bits * 1_000_000_000 / (den * symbol_ns)
            }
        }
    }
}

impl fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Data subcarriers per OFDM symbol.
fn data_subcarriers(class: ModulationClass, channel_width_mhz: u16) -> u64 {
    match (class, channel_width_mhz) {
        (ModulationClass::He, 20) => 234,
        (ModulationClass::He, 40) => 468,
        (ModulationClass::He, 80) => 980,
        (ModulationClass::He, 160) => 1960,
        (ModulationClass::He, _) => 0,
        (_, 20) => 52,
        (_, 40) => 108,
        (_, 80) => 234,
        (_, 160) => 468,
        _ => 0,
    }
}

/// OFDM symbol duration including the guard interval.
fn symbol_duration_ns(class: ModulationClass, guard_interval_ns: u16) -> u64 {
    let useful = match class {
        ModulationClass::He => 12_800,
        _ => 3_200,
    };
    useful + u64::from(guard_interval_ns)
}

// ─── Mode Catalogs ──────────────────────────────────────────────────────────

/// Clause 15/16 DSSS and HR/DSSS rates.
pub const DSSS_MODES: &[TransmissionMode] = &[
    TransmissionMode::legacy("DsssRate1Mbps", ModulationClass::Dsss, 0, 2, CodeRate::Undefined, 1_000_000),
    TransmissionMode::legacy("DsssRate2Mbps", ModulationClass::Dsss, 1, 4, CodeRate::Undefined, 2_000_000),
    TransmissionMode::legacy("DsssRate5_5Mbps", ModulationClass::HrDsss, 2, 16, CodeRate::Undefined, 5_500_000),
    TransmissionMode::legacy("DsssRate11Mbps", ModulationClass::HrDsss, 3, 256, CodeRate::Undefined, 11_000_000),
];

/// Clause 17 OFDM rates (5 GHz).
pub const OFDM_MODES: &[TransmissionMode] = &[
    TransmissionMode::legacy("OfdmRate6Mbps", ModulationClass::Ofdm, 0, 2, CodeRate::Half, 6_000_000),
    TransmissionMode::legacy("OfdmRate9Mbps", ModulationClass::Ofdm, 1, 2, CodeRate::ThreeQuarters, 9_000_000),
    TransmissionMode::legacy("OfdmRate12Mbps", ModulationClass::Ofdm, 2, 4, CodeRate::Half, 12_000_000),
    TransmissionMode::legacy("OfdmRate18Mbps", ModulationClass::Ofdm, 3, 4, CodeRate::ThreeQuarters, 18_000_000),
    TransmissionMode::legacy("OfdmRate24Mbps", ModulationClass::Ofdm, 4, 16, CodeRate::Half, 24_000_000),
    TransmissionMode::legacy("OfdmRate36Mbps", ModulationClass::Ofdm, 5, 16, CodeRate::ThreeQuarters, 36_000_000),
    TransmissionMode::legacy("OfdmRate48Mbps", ModulationClass::Ofdm, 6, 64, CodeRate::TwoThirds, 48_000_000),
    TransmissionMode::legacy("OfdmRate54Mbps", ModulationClass::Ofdm, 7, 64, CodeRate::ThreeQuarters, 54_000_000),
];

/// Clause 18 ERP-OFDM rates (2.4 GHz).
pub const ERP_OFDM_MODES: &[TransmissionMode] = &[
    TransmissionMode::legacy("ErpOfdmRate6Mbps", ModulationClass::ErpOfdm, 0, 2, CodeRate::Half, 6_000_000),
    TransmissionMode::legacy("ErpOfdmRate9Mbps", ModulationClass::ErpOfdm, 1, 2, CodeRate::ThreeQuarters, 9_000_000),
    TransmissionMode::legacy("ErpOfdmRate12Mbps", ModulationClass::ErpOfdm, 2, 4, CodeRate::Half, 12_000_000),
    TransmissionMode::legacy("ErpOfdmRate18Mbps", ModulationClass::ErpOfdm, 3, 4, CodeRate::ThreeQuarters, 18_000_000),
    TransmissionMode::legacy("ErpOfdmRate24Mbps", ModulationClass::ErpOfdm, 4, 16, CodeRate::Half, 24_000_000),
    TransmissionMode::legacy("ErpOfdmRate36Mbps", ModulationClass::ErpOfdm, 5, 16, CodeRate::ThreeQuarters, 36_000_000),
    TransmissionMode::legacy("ErpOfdmRate48Mbps", ModulationClass::ErpOfdm, 6, 64, CodeRate::TwoThirds, 48_000_000),
    TransmissionMode::legacy("ErpOfdmRate54Mbps", ModulationClass::ErpOfdm, 7, 64, CodeRate::ThreeQuarters, 54_000_000),
];

/// HT MCS 0–31 (up to four spatial streams).
pub const HT_MCS: &[TransmissionMode] = &[
    TransmissionMode::scheme("HtMcs0", ModulationClass::Ht, 0),
    TransmissionMode::scheme("HtMcs1", ModulationClass::Ht, 1),
    TransmissionMode::scheme("HtMcs2", ModulationClass::Ht, 2),
    TransmissionMode::scheme("HtMcs3", ModulationClass::Ht, 3),
    TransmissionMode::scheme("HtMcs4", ModulationClass::Ht, 4),
    TransmissionMode::scheme("HtMcs5", ModulationClass::Ht, 5),
    TransmissionMode::scheme("HtMcs6", ModulationClass::Ht, 6),
    TransmissionMode::scheme("HtMcs7", ModulationClass::Ht, 7),
    TransmissionMode::scheme("HtMcs8", ModulationClass::Ht, 8),
    TransmissionMode::scheme("HtMcs9", ModulationClass::Ht, 9),
    TransmissionMode::scheme("HtMcs10", ModulationClass::Ht, 10),
    TransmissionMode::scheme("HtMcs11", ModulationClass::Ht, 11),
    TransmissionMode::scheme("HtMcs12", ModulationClass::Ht, 12),
    TransmissionMode::scheme("HtMcs13", ModulationClass::Ht, 13),
    TransmissionMode::scheme("HtMcs14", ModulationClass::Ht, 14),
    TransmissionMode::scheme("HtMcs15", ModulationClass::Ht, 15),
    TransmissionMode::scheme("HtMcs16", ModulationClass::Ht, 16),
    TransmissionMode::scheme("HtMcs17", ModulationClass::Ht, 17),
    TransmissionMode::scheme("HtMcs18", ModulationClass::Ht, 18),
    TransmissionMode::scheme("HtMcs19", ModulationClass::Ht, 19),
    TransmissionMode::scheme("HtMcs20", ModulationClass::Ht, 20),
    TransmissionMode::scheme("HtMcs21", ModulationClass::Ht, 21),
    TransmissionMode::scheme("HtMcs22", ModulationClass::Ht, 22),
    TransmissionMode::scheme("HtMcs23", ModulationClass::Ht, 23),
    TransmissionMode::scheme("HtMcs24", ModulationClass::Ht, 24),
    TransmissionMode::scheme("HtMcs25", ModulationClass::Ht, 25),
    TransmissionMode::scheme("HtMcs26", ModulationClass::Ht, 26),
    TransmissionMode::scheme("HtMcs27", ModulationClass::Ht, 27),
    TransmissionMode::scheme("HtMcs28", ModulationClass::Ht, 28),
    TransmissionMode::scheme("HtMcs29", ModulationClass::Ht, 29),
    TransmissionMode::scheme("HtMcs30", ModulationClass::Ht, 30),
    TransmissionMode::scheme("HtMcs31", ModulationClass::Ht, 31),
];

/// VHT MCS 0–9.
pub const VHT_MCS: &[TransmissionMode] = &[
    TransmissionMode::scheme("VhtMcs0", ModulationClass::Vht, 0),
    TransmissionMode::scheme("VhtMcs1", ModulationClass::Vht, 1),
    TransmissionMode::scheme("VhtMcs2", ModulationClass::Vht, 2),
    TransmissionMode::scheme("VhtMcs3", ModulationClass::Vht, 3),
    TransmissionMode::scheme("VhtMcs4", ModulationClass::Vht, 4),
    TransmissionMode::scheme("VhtMcs5", ModulationClass::Vht, 5),
    TransmissionMode::scheme("VhtMcs6", ModulationClass::Vht, 6),
    TransmissionMode::scheme("VhtMcs7", ModulationClass::Vht, 7),
    TransmissionMode::scheme("VhtMcs8", ModulationClass::Vht, 8),
    TransmissionMode::scheme("VhtMcs9", ModulationClass::Vht, 9),
];

/// HE MCS 0–11.
pub const HE_MCS: &[TransmissionMode] = &[
    TransmissionMode::scheme("HeMcs0", ModulationClass::He, 0),
    TransmissionMode::scheme("HeMcs1", ModulationClass::He, 1),
    TransmissionMode::scheme("HeMcs2", ModulationClass::He, 2),
    TransmissionMode::scheme("HeMcs3", ModulationClass::He, 3),
    TransmissionMode::scheme("HeMcs4", ModulationClass::He, 4),
    TransmissionMode::scheme("HeMcs5", ModulationClass::He, 5),
    TransmissionMode::scheme("HeMcs6", ModulationClass::He, 6),
    TransmissionMode::scheme("HeMcs7", ModulationClass::He, 7),
    TransmissionMode::scheme("HeMcs8", ModulationClass::He, 8),
    TransmissionMode::scheme("HeMcs9", ModulationClass::He, 9),
    TransmissionMode::scheme("HeMcs10", ModulationClass::He, 10),
    TransmissionMode::scheme("HeMcs11", ModulationClass::He, 11),
];

/// Every mode the catalogs know about, legacy first.
pub fn all_modes() -> impl Iterator<Item = TransmissionMode> {
    DSSS_MODES
        .iter()
        .chain(OFDM_MODES)
        .chain(ERP_OFDM_MODES)
        .chain(HT_MCS)
        .chain(VHT_MCS)
        .chain(HE_MCS)
        .copied()
}

/// Look a mode up by its unique name (e.g. `"OfdmRate6Mbps"`, `"VhtMcs7"`).
pub fn mode_by_name(name: &str) -> Option<TransmissionMode> {
    all_modes().find(|m| m.name == name)
}
