use super::state::{AffectState, PerceptionInput, Posture};
use crate::config::AffectConfig;
use crate::security::Tier;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Callback invoked with `(old, new)` after every mutation.
pub type AffectObserver = Arc<dyn Fn(&AffectState, &AffectState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owned, shareable affect state for one session.
///
/// Mutators hold the state lock only while applying the change; observers
/// run afterwards with no lock held, so they may read, mutate, subscribe
/// or unsubscribe freely.
pub struct AffectModel {
    state: Mutex<AffectState>,
    config: AffectConfig,
    observers: Mutex<HashMap<SubscriptionId, AffectObserver>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for AffectModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffectModel")
            .field("state", &self.snapshot())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AffectModel {
    pub fn new(state: AffectState, config: AffectConfig) -> Self {
        Self {
            state: Mutex::new(state.normalized()),
            config,
            observers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &AffectConfig {
        &self.config
    }

    pub fn snapshot(&self) -> AffectState {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn trust(&self) -> f64 {
        self.snapshot().trust()
    }

    pub fn tier(&self) -> Tier {
        self.snapshot().tier()
    }

    pub fn subscribe(&self, observer: AffectObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, observer);
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn mutate<R>(&self, apply: impl FnOnce(&mut AffectState, &AffectConfig) -> R) -> R {
        let (old, new, out) = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let old = state.clone();
            let out = apply(&mut *state, &self.config);
            (old, state.clone(), out)
        };

        let observers: Vec<AffectObserver> = self
            .observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for observer in observers {
            observer(&old, &new);
        }
        out
    }

    pub fn update_trust(&self, target: f64) {
        self.mutate(|state, config| state.update_trust(target, config));
    }

    pub fn update_warmth(&self, target: f64) {
        self.mutate(|state, config| state.update_warmth(target, config));
    }

    pub fn update_arousal(&self, target: f64) {
        self.mutate(|state, _| state.update_arousal(target));
    }

    pub fn update_valence(&self, target: f64) {
        self.mutate(|state, _| state.update_valence(target));
    }

    /// Returns the trust value after the penalty.
    pub fn apply_penalty(&self, amount: f64) -> f64 {
        self.mutate(|state, _| {
            state.apply_penalty(amount);
            state.trust()
        })
    }

    pub fn apply_perception(&self, input: PerceptionInput) {
        let now = Utc::now();
        self.mutate(|state, config| state.apply_perception(input, config, now));
    }

    pub fn decay(&self) {
        self.mutate(AffectState::decay);
    }

    pub fn check_reunion(&self) -> bool {
        self.check_reunion_at(Utc::now())
    }

    pub fn check_reunion_at(&self, now: DateTime<Utc>) -> bool {
        let fired = self.mutate(|state, config| state.check_reunion(now, config));
        if fired {
            tracing::info!("reunion detected; arousal spiked");
        }
        fired
    }

    pub fn is_slumber(&self) -> bool {
        self.snapshot().is_slumber(&self.config)
    }

    pub fn is_crisis(&self) -> bool {
        self.snapshot().is_crisis(&self.config)
    }

    pub fn set_posture(&self, posture: Posture) {
        self.mutate(|state, _| state.set_posture(posture));
    }

    pub fn set_elastic_mode(&self, enabled: bool) {
        self.mutate(|state, _| state.set_elastic_mode(enabled));
    }

    pub fn set_door_slam(&self, active: bool) {
        self.mutate(|state, _| state.set_door_slam(active));
    }
}
