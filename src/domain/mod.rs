//! Domain layer types and invariants.

pub mod callout;
pub mod slug;
pub mod summary;
pub mod writeup;
