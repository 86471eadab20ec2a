//! Real-time adaptation tracking — what changed, and what to do about it.

pub mod tracker;

pub use tracker::{
    AdaptationState, AdaptationTracker, ChangeCallback, ChangeEvent, ChangeType, StateSnapshot,
    SubscriptionId,
};
