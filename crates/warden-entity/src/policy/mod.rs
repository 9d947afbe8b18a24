//! Authorization policy model.

pub mod matcher;
pub mod rule;

pub use matcher::{AccessRequest, PolicySet, key_match};
pub use rule::{GroupingRule, PolicyRule};
