//! Conversation flow — the two-phase state machine and its outputs.
//!
//! The flow manager decides when the structured onboarding gives way to the
//! open career conversation (one-way, never back), what to ask next, which
//! tools the dialogue generator may use, and the system directive that
//! carries all of it to the external generator.

pub mod manager;
pub mod prompts;

pub use manager::{FlowManager, FlowState, Phase, ToolFlags};
