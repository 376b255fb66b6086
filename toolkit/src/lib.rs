//! Utilities built on top of `search-core`'s public contract: result
//! pagination, a request-history wrapper, duplicate-document removal, and
//! batch query dispatch. Nothing in here touches the index internals.

pub mod batch;
pub mod dedup;
pub mod paginator;
pub mod request_queue;

pub use batch::{process_queries, process_queries_joined};
pub use dedup::remove_duplicates;
pub use paginator::paginate;
pub use request_queue::RequestQueue;
