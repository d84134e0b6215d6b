//! RPC rate limiting
//!
//! A continuously refilled token bucket and a [`Throttled`] wrapper that
//! applies it to every warehouse RPC. The client is shared across all deploy
//! tasks, so the bucket bounds the whole run's outgoing request rate.

use crate::error::DbResult;
use crate::traits::Warehouse;
use crate::types::{
    DatasetInfo, JobMetadata, ModelInfo, QueryJobConfig, ResourceMetadata, RoutineInfo, TableInfo,
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket: capacity equals the per-minute rate, refilled continuously.
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Allow `rate` acquisitions per minute (burst up to `rate`).
    pub fn per_minute(rate: u32) -> Self {
        let capacity = f64::from(rate.max(1));
        Self {
            capacity,
            refill_per_sec: capacity / 60.0,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, sleeping until one is available.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                (1.0 - bucket.tokens) / self.refill_per_sec
            };
            sleep(Duration::from_secs_f64(wait)).await;
        }
    }
}

/// Warehouse wrapper that pulls a token before every RPC.
pub struct Throttled<W> {
    inner: W,
    limiter: RateLimiter,
}

impl<W> Throttled<W> {
    pub fn new(inner: W, rpcs_per_minute: u32) -> Self {
        Self {
            inner,
            limiter: RateLimiter::per_minute(rpcs_per_minute),
        }
    }
}

#[async_trait]
impl<W: Warehouse> Warehouse for Throttled<W> {
    fn project_id(&self) -> String {
        // local state, not an RPC
        self.inner.project_id()
    }

    async fn run_query_job(&self, config: &QueryJobConfig) -> DbResult<JobMetadata> {
        self.limiter.acquire().await;
        self.inner.run_query_job(config).await
    }

    async fn list_child_jobs(&self, parent_job_id: &str) -> DbResult<Vec<JobMetadata>> {
        self.limiter.acquire().await;
        self.inner.list_child_jobs(parent_job_id).await
    }

    async fn get_dataset(&self, project: &str, dataset: &str) -> DbResult<DatasetInfo> {
        self.limiter.acquire().await;
        self.inner.get_dataset(project, dataset).await
    }

    async fn get_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<TableInfo> {
        self.limiter.acquire().await;
        self.inner.get_table(project, dataset, name).await
    }

    async fn get_routine(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
    ) -> DbResult<RoutineInfo> {
        self.limiter.acquire().await;
        self.inner.get_routine(project, dataset, name).await
    }

    async fn get_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<ModelInfo> {
        self.limiter.acquire().await;
        self.inner.get_model(project, dataset, name).await
    }

    async fn table_exists(&self, project: &str, dataset: &str, name: &str) -> DbResult<bool> {
        self.limiter.acquire().await;
        self.inner.table_exists(project, dataset, name).await
    }

    async fn list_tables(&self, project: &str, dataset: &str) -> DbResult<Vec<TableInfo>> {
        self.limiter.acquire().await;
        self.inner.list_tables(project, dataset).await
    }

    async fn list_routines(&self, project: &str, dataset: &str) -> DbResult<Vec<RoutineInfo>> {
        self.limiter.acquire().await;
        self.inner.list_routines(project, dataset).await
    }

    async fn list_models(&self, project: &str, dataset: &str) -> DbResult<Vec<ModelInfo>> {
        self.limiter.acquire().await;
        self.inner.list_models(project, dataset).await
    }

    async fn create_view(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        view_query: &str,
    ) -> DbResult<TableInfo> {
        self.limiter.acquire().await;
        self.inner.create_view(project, dataset, name, view_query).await
    }

    async fn delete_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner.delete_table(project, dataset, name).await
    }

    async fn delete_routine(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner.delete_routine(project, dataset, name).await
    }

    async fn delete_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner.delete_model(project, dataset, name).await
    }

    async fn update_dataset_metadata(
        &self,
        project: &str,
        dataset: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner
            .update_dataset_metadata(project, dataset, metadata)
            .await
    }

    async fn update_table_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner
            .update_table_metadata(project, dataset, name, metadata)
            .await
    }

    async fn update_routine_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        self.limiter.acquire().await;
        self.inner
            .update_routine_metadata(project, dataset, name, metadata)
            .await
    }
}

#[cfg(test)]
#[path = "throttle_test.rs"]
mod tests;
