//! # Injury Hub Cache
//!
//! In-memory key/value store of query results with insertion timestamps.
//! Reads honour a caller-supplied time-to-live; entries are never updated
//! in place, only replaced.

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::cache_key;
pub use store::{CacheEntry, CacheStats, CacheStore};
