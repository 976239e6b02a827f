//! The two tool operations, independent of the MCP wire format.

pub mod read;
pub mod search;

pub use read::ReadOperation;
pub use search::{SearchOperation, SearchRecord, MAX_RESULTS};
