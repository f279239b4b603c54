//! Continuous trust/affect signal, its dynamics and persistence.

mod model;
mod state;
mod store;

pub use model::{AffectModel, AffectObserver, SubscriptionId};
pub use state::{AffectState, PerceptionInput, Posture};
pub use store::AffectStore;
