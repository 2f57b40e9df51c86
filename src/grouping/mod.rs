//! Context-keyed fact grouping and duplicate classification.
pub mod duplicates;
pub mod group;

pub use duplicates::DuplicateClass;
pub use group::{group_facts, ConceptFacts, ContextGroup, CrossRef, FactGroups};
