//! Application-level configuration.
//!
//! - [`DiscussionParams`]: fan-out limit, per-role timeout, run deadline, retry policy

pub mod discussion_params;

pub use discussion_params::DiscussionParams;
