//! Idempotent event creation. The calendar itself is the record of what has
//! been synced: every event carries its sync key as a private property.

mod engine;
pub mod key;

pub use engine::{SyncOutcome, SyncSummary, Synchronizer, SYNC_PROPERTY_KEY};
pub use key::{make_key, slugify};
