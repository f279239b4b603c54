use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Rates and thresholds for the affect state dynamics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectConfig {
    /// Fraction of the gap closed when trust/warmth rise toward a target.
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    /// Fraction of the gap closed when trust falls toward a target.
    #[serde(default = "default_damage_rate")]
    pub damage_rate: f64,
    /// Delta amplification while elastic mode is active.
    #[serde(default = "default_elastic_multiplier")]
    pub elastic_multiplier: f64,
    /// Blend fraction for arousal/valence updates from perception input.
    #[serde(default = "default_perception_blend")]
    pub perception_blend: f64,
    #[serde(default = "default_arousal_baseline")]
    pub arousal_baseline: f64,
    #[serde(default = "default_arousal_decay")]
    pub arousal_decay: f64,
    #[serde(default = "default_arousal_floor")]
    pub arousal_floor: f64,
    #[serde(default = "default_warmth_neutral")]
    pub warmth_neutral: f64,
    #[serde(default = "default_warmth_decay")]
    pub warmth_decay: f64,
    #[serde(default = "default_valence_decay")]
    pub valence_decay: f64,
    #[serde(default = "default_reunion_after_hours")]
    pub reunion_after_hours: u32,
    #[serde(default = "default_reunion_arousal")]
    pub reunion_arousal: f64,
    #[serde(default = "default_slumber_below")]
    pub slumber_below: f64,
    /// Valence is bipolar, `[-1, 1]`.
    #[serde(default = "default_crisis_valence_below")]
    pub crisis_valence_below: f64,
}

fn default_growth_rate() -> f64 {
    0.25
}

fn default_damage_rate() -> f64 {
    0.8
}

fn default_elastic_multiplier() -> f64 {
    2.0
}

fn default_perception_blend() -> f64 {
    0.5
}

fn default_arousal_baseline() -> f64 {
    0.5
}

fn default_arousal_decay() -> f64 {
    0.1
}

fn default_arousal_floor() -> f64 {
    0.2
}

fn default_warmth_neutral() -> f64 {
    0.5
}

fn default_warmth_decay() -> f64 {
    0.02
}

fn default_valence_decay() -> f64 {
    0.05
}

fn default_reunion_after_hours() -> u32 {
    48
}

fn default_reunion_arousal() -> f64 {
    0.9
}

fn default_slumber_below() -> f64 {
    0.3
}

fn default_crisis_valence_below() -> f64 {
    -0.4
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            growth_rate: default_growth_rate(),
            damage_rate: default_damage_rate(),
            elastic_multiplier: default_elastic_multiplier(),
            perception_blend: default_perception_blend(),
            arousal_baseline: default_arousal_baseline(),
            arousal_decay: default_arousal_decay(),
            arousal_floor: default_arousal_floor(),
            warmth_neutral: default_warmth_neutral(),
            warmth_decay: default_warmth_decay(),
            valence_decay: default_valence_decay(),
            reunion_after_hours: default_reunion_after_hours(),
            reunion_arousal: default_reunion_arousal(),
            slumber_below: default_slumber_below(),
            crisis_valence_below: default_crisis_valence_below(),
        }
    }
}

fn unit(label: &str, value: f64) -> Result<()> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        anyhow::bail!("affect.{label} must be in [0.0, 1.0]");
    }
    Ok(())
}

impl AffectConfig {
    pub fn validate(&self) -> Result<()> {
        unit("growth_rate", self.growth_rate)?;
        unit("damage_rate", self.damage_rate)?;
        unit("perception_blend", self.perception_blend)?;
        unit("arousal_baseline", self.arousal_baseline)?;
        unit("arousal_decay", self.arousal_decay)?;
        unit("arousal_floor", self.arousal_floor)?;
        unit("warmth_neutral", self.warmth_neutral)?;
        unit("warmth_decay", self.warmth_decay)?;
        unit("valence_decay", self.valence_decay)?;
        unit("reunion_arousal", self.reunion_arousal)?;
        unit("slumber_below", self.slumber_below)?;

        if self.growth_rate <= 0.0 {
            anyhow::bail!("affect.growth_rate must be > 0");
        }
        if self.growth_rate >= self.damage_rate {
            anyhow::bail!("affect.growth_rate must be < affect.damage_rate");
        }
        if self.elastic_multiplier.is_nan() || self.elastic_multiplier < 1.0 {
            anyhow::bail!("affect.elastic_multiplier must be >= 1.0");
        }
        if self.crisis_valence_below.is_nan() || !(-1.0..=1.0).contains(&self.crisis_valence_below)
        {
            anyhow::bail!("affect.crisis_valence_below must be in [-1.0, 1.0]");
        }
        if self.reunion_after_hours == 0 {
            anyhow::bail!("affect.reunion_after_hours must be >= 1");
        }
        Ok(())
    }
}
