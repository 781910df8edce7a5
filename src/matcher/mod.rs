//! Pattern matching for Stacks and Bitcoin addresses.
//!
//! Supports two matching strategies over the address body (the address with
//! its fixed network/format prefix removed):
//! - Prefix: Match at the start of the body
//! - Suffix: Match at the end of the address

mod pattern;

pub use pattern::{MatchResult, Pattern, PatternType, Target};
