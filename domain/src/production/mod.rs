//! Production parameters and the Decision Framework.
//!
//! Everything in this module is pure: it turns a [`ProductionRequest`] into a
//! [`CoreDecision`], the numeric, non-negotiable constraints every later
//! stage works within.
//!
//! ```text
//! ProductionRequest ──► DecisionFramework::decide ──► CoreDecision
//!   (duration, platform,       (clip split, word budget,    (immutable)
//!    language, voice)           tolerance, voice)
//! ```

pub mod decision;
pub mod language;
pub mod platform;

pub use decision::{
    CoreDecision, DEFAULT_MAX_CLIP_DURATION, DEFAULT_SAFETY_FACTOR, DEFAULT_SPEECH_RATE,
    DecisionFramework, DecisionParams, ProductionRequest,
};
pub use language::Language;
pub use platform::{DEFAULT_TOLERANCE, Platform, Tolerance};
