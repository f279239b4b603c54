use crate::config::AffectConfig;
use crate::security::Tier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Interaction stance suggested to collaborators. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Posture {
    #[default]
    Companion,
    CoPilot,
    Peer,
    Expert,
}

impl Posture {
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Stranger => Self::Companion,
            Tier::Associate => Self::CoPilot,
            Tier::Partner => Self::Peer,
            Tier::Surrogate => Self::Expert,
        }
    }
}

/// Scores supplied by the perception collaborator for one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptionInput {
    /// `[0, 1]`
    pub urgency: f64,
    /// `[0, 1]`
    pub load: f64,
    /// `[-1, 1]`
    pub sentiment: f64,
}

/// Continuous trust/affect signal. Unipolar fields live in `[0, 1]`,
/// valence in `[-1, 1]`; every mutator clamps, so fields are private.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectState {
    trust: f64,
    warmth: f64,
    arousal: f64,
    valence: f64,
    posture: Posture,
    elastic_mode: bool,
    last_interaction_at: DateTime<Utc>,
    door_slam_active: bool,
}

impl Default for AffectState {
    fn default() -> Self {
        Self {
            trust: 0.5,
            warmth: 0.5,
            arousal: 0.5,
            valence: 0.0,
            posture: Posture::Companion,
            elastic_mode: false,
            last_interaction_at: Utc::now(),
            door_slam_active: false,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn clamp_bipolar(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Move `current` toward `target` by `fraction` of the gap.
fn blend(current: f64, target: f64, fraction: f64) -> f64 {
    current + (target - current) * fraction
}

impl AffectState {
    pub fn with_trust(mut self, trust: f64) -> Self {
        self.trust = clamp_unit(trust);
        self
    }

    pub fn with_warmth(mut self, warmth: f64) -> Self {
        self.warmth = clamp_unit(warmth);
        self
    }

    pub fn with_arousal(mut self, arousal: f64) -> Self {
        self.arousal = clamp_unit(arousal);
        self
    }

    pub fn with_valence(mut self, valence: f64) -> Self {
        self.valence = clamp_bipolar(valence);
        self
    }

    pub fn with_last_interaction_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_interaction_at = at;
        self
    }

    /// Re-clamp every field; used after deserializing untrusted input.
    pub fn normalized(self) -> Self {
        Self {
            trust: clamp_unit(self.trust),
            warmth: clamp_unit(self.warmth),
            arousal: clamp_unit(self.arousal),
            valence: clamp_bipolar(self.valence),
            ..self
        }
    }

    pub fn trust(&self) -> f64 {
        self.trust
    }

    pub fn warmth(&self) -> f64 {
        self.warmth
    }

    pub fn arousal(&self) -> f64 {
        self.arousal
    }

    pub fn valence(&self) -> f64 {
        self.valence
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn elastic_mode(&self) -> bool {
        self.elastic_mode
    }

    pub fn last_interaction_at(&self) -> DateTime<Utc> {
        self.last_interaction_at
    }

    pub fn door_slam_active(&self) -> bool {
        self.door_slam_active
    }

    pub fn tier(&self) -> Tier {
        Tier::classify(self.trust)
    }

    /// `(growth, damage)` after elastic amplification. Damage is capped at
    /// 1.0 and growth keeps its ratio to damage, so growth stays strictly
    /// below damage even when the cap bites.
    fn effective_rates(&self, config: &AffectConfig) -> (f64, f64) {
        let (growth, damage) = (config.growth_rate, config.damage_rate);
        if !self.elastic_mode {
            return (growth, damage);
        }
        let elastic_damage = (damage * config.elastic_multiplier).min(1.0);
        let elastic_growth = if damage > 0.0 {
            elastic_damage * growth / damage
        } else {
            (growth * config.elastic_multiplier).min(1.0)
        };
        (elastic_growth, elastic_damage)
    }

    /// Asymmetric update: growth closes `growth_rate` of the gap, damage
    /// closes `damage_rate` of it.
    pub fn update_trust(&mut self, target: f64, config: &AffectConfig) {
        let target = clamp_unit(target);
        let (growth, damage) = self.effective_rates(config);
        let rate = if target > self.trust { growth } else { damage };
        self.trust = clamp_unit(blend(self.trust, target, rate));
    }

    pub fn update_warmth(&mut self, target: f64, config: &AffectConfig) {
        let (growth, _) = self.effective_rates(config);
        self.warmth = clamp_unit(blend(self.warmth, clamp_unit(target), growth));
    }

    pub fn update_arousal(&mut self, target: f64) {
        self.arousal = clamp_unit(target);
    }

    pub fn update_valence(&mut self, target: f64) {
        self.valence = clamp_bipolar(target);
    }

    /// Subtract a fixed penalty from trust, floored at zero.
    pub fn apply_penalty(&mut self, amount: f64) {
        self.trust = clamp_unit(self.trust - amount.max(0.0));
    }

    pub fn apply_perception(
        &mut self,
        input: PerceptionInput,
        config: &AffectConfig,
        now: DateTime<Utc>,
    ) {
        let arousal_target = clamp_unit(input.urgency).max(clamp_unit(input.load));
        self.arousal = clamp_unit(blend(
            self.arousal,
            arousal_target,
            config.perception_blend,
        ));
        self.valence = clamp_bipolar(blend(
            self.valence,
            clamp_bipolar(input.sentiment),
            config.perception_blend,
        ));
        self.last_interaction_at = now;
    }

    /// One tick: arousal drifts to baseline (never below the floor),
    /// warmth and valence drift to neutral more slowly.
    pub fn decay(&mut self, config: &AffectConfig) {
        let arousal = blend(self.arousal, config.arousal_baseline, config.arousal_decay);
        self.arousal = clamp_unit(arousal.max(config.arousal_floor));
        self.warmth = clamp_unit(blend(
            self.warmth,
            config.warmth_neutral,
            config.warmth_decay,
        ));
        self.valence = clamp_bipolar(blend(self.valence, 0.0, config.valence_decay));
    }

    /// Spike arousal after a long absence. Returns whether it fired.
    pub fn check_reunion(&mut self, now: DateTime<Utc>, config: &AffectConfig) -> bool {
        let threshold = Duration::hours(i64::from(config.reunion_after_hours));
        let fired = now.signed_duration_since(self.last_interaction_at) > threshold;
        if fired {
            self.arousal = clamp_unit(self.arousal.max(config.reunion_arousal));
        }
        self.last_interaction_at = now;
        fired
    }

    pub fn is_slumber(&self, config: &AffectConfig) -> bool {
        self.arousal < config.slumber_below
    }

    pub fn is_crisis(&self, config: &AffectConfig) -> bool {
        self.door_slam_active || self.valence < config.crisis_valence_below
    }

    pub fn set_posture(&mut self, posture: Posture) {
        self.posture = posture;
    }

    pub fn set_elastic_mode(&mut self, enabled: bool) {
        self.elastic_mode = enabled;
    }

    pub fn set_door_slam(&mut self, active: bool) {
        self.door_slam_active = active;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_interaction_at = now;
    }

    pub fn unit_fields_in_range(&self) -> bool {
        [self.trust, self.warmth, self.arousal]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
            && (-1.0..=1.0).contains(&self.valence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AffectConfig {
        AffectConfig::default()
    }

    #[test]
    fn trust_growth_is_asymptotic() {
        let cfg = config();
        let mut state = AffectState::default().with_trust(0.5);
        state.update_trust(1.0, &cfg);
        assert!((state.trust() - 0.625).abs() < 1e-9);
        for _ in 0..200 {
            state.update_trust(1.0, &cfg);
        }
        assert!(state.trust() <= 1.0);
        assert!(state.trust() > 0.99);
    }

    #[test]
    fn damage_exceeds_growth_for_equal_offsets() {
        let cfg = config();
        for start in [0.2, 0.5, 0.7, 0.85] {
            for d in [0.05, 0.1, 0.15] {
                let mut up = AffectState::default().with_trust(start);
                up.update_trust(start + d, &cfg);
                let mut down = AffectState::default().with_trust(start);
                down.update_trust(start - d, &cfg);
                let rise = up.trust() - start;
                let drop = start - down.trust();
                assert!(drop > rise, "start={start} d={d}: drop {drop} <= rise {rise}");
            }
        }
    }

    #[test]
    fn elastic_mode_amplifies_growth() {
        let cfg = config();
        let mut plain = AffectState::default().with_trust(0.4);
        plain.update_trust(0.8, &cfg);

        let mut elastic = AffectState::default().with_trust(0.4);
        elastic.set_elastic_mode(true);
        elastic.update_trust(0.8, &cfg);

        assert!(elastic.trust() > plain.trust());
        assert!(elastic.trust() <= 0.8);
    }

    #[test]
    fn elastic_cap_keeps_damage_above_growth() {
        let cfg = AffectConfig {
            growth_rate: 0.5,
            damage_rate: 0.8,
            ..AffectConfig::default()
        };
        cfg.validate().unwrap();

        let start = 0.5;
        let mut up = AffectState::default().with_trust(start);
        up.set_elastic_mode(true);
        up.update_trust(start + 0.1, &cfg);
        let mut down = AffectState::default().with_trust(start);
        down.set_elastic_mode(true);
        down.update_trust(start - 0.1, &cfg);

        let rise = up.trust() - start;
        let drop = start - down.trust();
        assert!(drop > rise, "drop {drop} <= rise {rise}");
        assert!(up.trust() < start + 0.1);
    }

    #[test]
    fn out_of_range_targets_are_clamped() {
        let cfg = config();
        let mut state = AffectState::default();
        state.update_trust(5.0, &cfg);
        state.update_warmth(-3.0, &cfg);
        state.update_arousal(9.0);
        state.update_valence(-7.0);
        assert!(state.unit_fields_in_range());
        assert!((state.arousal() - 1.0).abs() < f64::EPSILON);
        assert!((state.valence() + 1.0).abs() < f64::EPSILON);

        state.update_trust(f64::NAN, &cfg);
        assert!(state.unit_fields_in_range());
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut state = AffectState::default().with_trust(0.01);
        state.apply_penalty(0.02);
        assert!(state.trust().abs() < f64::EPSILON);
    }

    #[test]
    fn decay_pulls_arousal_to_baseline_but_not_below_floor() {
        let cfg = config();
        let mut high = AffectState::default().with_arousal(1.0);
        high.decay(&cfg);
        assert!((high.arousal() - 0.95).abs() < 1e-9);

        let mut low = AffectState::default().with_arousal(0.05);
        low.decay(&cfg);
        assert!(low.arousal() >= cfg.arousal_floor);
    }

    #[test]
    fn decay_relaxes_valence_toward_neutral() {
        let cfg = config();
        let mut state = AffectState::default().with_valence(-0.8);
        state.decay(&cfg);
        assert!(state.valence() > -0.8);
        assert!(state.valence() < 0.0);
    }

    #[test]
    fn reunion_spikes_arousal_after_absence() {
        let cfg = config();
        let now = Utc::now();
        let mut state = AffectState::default()
            .with_arousal(0.3)
            .with_last_interaction_at(now - Duration::hours(49));
        assert!(state.check_reunion(now, &cfg));
        assert!(state.arousal() >= 0.85);
        assert_eq!(state.last_interaction_at(), now);
    }

    #[test]
    fn reunion_does_not_fire_within_threshold() {
        let cfg = config();
        let now = Utc::now();
        let mut state = AffectState::default()
            .with_arousal(0.3)
            .with_last_interaction_at(now - Duration::hours(47));
        assert!(!state.check_reunion(now, &cfg));
        assert!((state.arousal() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn slumber_and_crisis_reads() {
        let cfg = config();
        assert!(AffectState::default().with_arousal(0.25).is_slumber(&cfg));
        assert!(!AffectState::default().with_arousal(0.3).is_slumber(&cfg));

        assert!(AffectState::default().with_valence(-0.5).is_crisis(&cfg));
        assert!(!AffectState::default().with_valence(-0.2).is_crisis(&cfg));

        let mut slammed = AffectState::default().with_valence(0.4);
        slammed.set_door_slam(true);
        assert!(slammed.is_crisis(&cfg));
    }

    #[test]
    fn perception_blends_and_stamps_interaction() {
        let cfg = config();
        let now = Utc::now();
        let mut state = AffectState::default()
            .with_arousal(0.2)
            .with_last_interaction_at(now - Duration::hours(3));
        state.apply_perception(
            PerceptionInput {
                urgency: 1.0,
                load: 0.4,
                sentiment: -1.0,
            },
            &cfg,
            now,
        );
        assert!((state.arousal() - 0.6).abs() < 1e-9);
        assert!((state.valence() + 0.5).abs() < 1e-9);
        assert_eq!(state.last_interaction_at(), now);
    }

    #[test]
    fn normalized_reclamps_deserialized_values() {
        let raw = serde_json::json!({
            "trust": 3.0,
            "warmth": -1.0,
            "arousal": 0.5,
            "valence": -4.0
        });
        let state: AffectState = serde_json::from_value(raw).unwrap();
        let state = state.normalized();
        assert!(state.unit_fields_in_range());
        assert!((state.trust() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn posture_tracks_tier() {
        assert_eq!(Posture::for_tier(Tier::Stranger), Posture::Companion);
        assert_eq!(Posture::for_tier(Tier::Surrogate), Posture::Expert);
        assert_eq!(Posture::CoPilot.to_string(), "co_pilot");
    }
}
