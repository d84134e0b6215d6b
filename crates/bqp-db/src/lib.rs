//! bqp-db - Warehouse abstraction for bqport
//!
//! This crate defines the [`Warehouse`] trait the deploy executor and the
//! reconciliation planner consume, the wire types for query jobs and
//! resource metadata, the `metadata.json` mirror, an RPC rate limiter, an
//! in-memory mock warehouse for tests, and the (stub) BigQuery REST backend.

pub mod bigquery;
pub mod error;
pub mod metadata;
pub mod mock;
pub mod throttle;
pub mod traits;
pub mod types;

pub use bigquery::BigQueryBackend;
pub use error::{DbError, DbResult};
pub use metadata::{sync_metadata, SyncTarget};
pub use mock::MockWarehouse;
pub use throttle::{RateLimiter, Throttled};
pub use traits::Warehouse;
pub use types::{
    ColumnMetadata, DatasetInfo, JobError, JobMetadata, JobPriority, JobStatistics, ModelInfo,
    ParamValue, QueryJobConfig, QueryParam, ResourceMetadata, RoutineInfo, TableInfo, TargetRef,
};
