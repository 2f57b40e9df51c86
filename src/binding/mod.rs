//! Binding preconditions for calculation relationships.
pub mod checker;
pub mod finder;

pub use checker::{BindingChecker, BindingResult, BindingStatus, FoundChild};
pub use finder::FactFinder;
