//! Feed retrieval and assembly.
//!
//! Most callers should use [`FeedClient::fetch`] which:
//!
//! - builds the query URL from [`FeedQuery`] (inclusive `Index_` range)
//! - performs one blocking request and decodes the [`FeedEnvelope`]
//! - coerces every record through a fresh [`crate::mapping::ColumnMapper`]
//! - optionally reports success/failure/alerts to a [`FeedObserver`]
//!
//! [`parse_envelope`] and [`assemble`] are available separately for bodies obtained elsewhere
//! (files, caches, tests).

pub mod client;
pub mod envelope;
pub mod observability;
pub mod query;

pub use client::{FeedClient, FeedOptions, stats_for};
pub use envelope::{Feature, FeedData, FeedEnvelope, ServiceError, assemble, parse_envelope};
pub use observability::{
    CompositeObserver, FeedContext, FeedObserver, FeedSeverity, FeedStats, FileObserver, StdErrObserver,
};
pub use query::{DEFAULT_BASE_URL, DEFAULT_INDEX_END, FeedQuery, INDEX_FIELD};
