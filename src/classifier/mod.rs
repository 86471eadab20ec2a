//! Persona classification — deterministic decision table over evidence.
//!
//! The classifier is a rule table, not a model: ties are resolved by rule
//! order, earlier rules always win. An optional async enhancer can refine
//! the result; any enhancer failure falls back to the deterministic
//! classification.

pub mod enhancer;
pub mod persona;
pub mod rules;

pub use enhancer::{ClassificationEnhancer, refine_with_enhancer};
pub use persona::{Classification, ClassificationStage, PersonaBucket, PersonaType};
pub use rules::PersonaClassifier;
