//! # Injury Hub Query
//!
//! The stable query surface used by the HTTP layer and by tool calls. Adds a
//! short-lived cache tier and post-hoc filtering on top of the aggregator.

mod facade;
mod tools;

pub use facade::{ConditionSearch, QueryCacheStats, QueryFacade};
pub use tools::ToolDispatcher;
