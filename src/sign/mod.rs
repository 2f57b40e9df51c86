//! Out-of-band sign-correction markers and their lookup.
pub mod lookup;

pub use lookup::{SignLookup, SignMarker};
