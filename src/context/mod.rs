//! Context classification and compatibility matching.
pub mod classifier;
pub mod matcher;

pub use classifier::{is_default, is_dimensional};
pub use matcher::{classify_match, ContextMatcher, MatchClass, MatchLevel};
