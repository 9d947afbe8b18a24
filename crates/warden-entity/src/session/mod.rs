//! Session value objects.

pub mod record;

pub use record::SessionRecord;
