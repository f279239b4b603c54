//! Trust tiers: discrete authority levels derived from continuous trust.

use serde::{Deserialize, Serialize};

/// Lower edge of [`Tier::Associate`].
pub const ASSOCIATE_MIN_TRUST: f64 = 0.6;
/// Lower edge of [`Tier::Partner`].
pub const PARTNER_MIN_TRUST: f64 = 0.8;
/// Lower edge of [`Tier::Surrogate`].
pub const SURROGATE_MIN_TRUST: f64 = 0.9;

/// Authority tier recomputed on demand from trust. Never persisted as
/// state; higher tiers receive broader advisory latitude.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Tier {
    /// trust < 0.6
    Stranger,
    /// 0.6 <= trust < 0.8
    Associate,
    /// 0.8 <= trust < 0.9
    Partner,
    /// trust >= 0.9
    Surrogate,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Stranger,
        Tier::Associate,
        Tier::Partner,
        Tier::Surrogate,
    ];

    /// Map trust to its tier. Lower edges are inclusive; NaN reads as
    /// `Stranger`.
    pub fn classify(trust: f64) -> Self {
        if trust >= SURROGATE_MIN_TRUST {
            Self::Surrogate
        } else if trust >= PARTNER_MIN_TRUST {
            Self::Partner
        } else if trust >= ASSOCIATE_MIN_TRUST {
            Self::Associate
        } else {
            Self::Stranger
        }
    }

    /// Snapshot-before-mutation applies at this tier and above.
    pub fn requires_snapshots(self) -> bool {
        self >= Self::Partner
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stranger => "stranger",
            Self::Associate => "associate",
            Self::Partner => "partner",
            Self::Surrogate => "surrogate",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}
