//! Warehouse trait definition

use crate::error::DbResult;
use crate::types::{
    DatasetInfo, JobMetadata, ModelInfo, QueryJobConfig, ResourceMetadata, RoutineInfo, TableInfo,
};
use async_trait::async_trait;

/// Warehouse abstraction consumed by the deploy executor and the
/// reconciliation planner.
///
/// Implementations must be safe for concurrent use; the client is built
/// once per run and shared across tasks.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// The client's ambient project (substituted for `@default` paths).
    fn project_id(&self) -> String;

    /// Submit a query job and wait for it to reach a terminal state.
    ///
    /// For dry runs the returned metadata carries cost statistics only.
    async fn run_query_job(&self, config: &QueryJobConfig) -> DbResult<JobMetadata>;

    /// Enumerate the child jobs of a script job.
    async fn list_child_jobs(&self, parent_job_id: &str) -> DbResult<Vec<JobMetadata>>;

    async fn get_dataset(&self, project: &str, dataset: &str) -> DbResult<DatasetInfo>;

    async fn get_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<TableInfo>;

    async fn get_routine(&self, project: &str, dataset: &str, name: &str)
        -> DbResult<RoutineInfo>;

    async fn get_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<ModelInfo>;

    async fn table_exists(&self, project: &str, dataset: &str, name: &str) -> DbResult<bool>;

    async fn list_tables(&self, project: &str, dataset: &str) -> DbResult<Vec<TableInfo>>;

    async fn list_routines(&self, project: &str, dataset: &str) -> DbResult<Vec<RoutineInfo>>;

    async fn list_models(&self, project: &str, dataset: &str) -> DbResult<Vec<ModelInfo>>;

    /// Create a view with the given defining query.
    async fn create_view(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        view_query: &str,
    ) -> DbResult<TableInfo>;

    async fn delete_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<()>;

    async fn delete_routine(&self, project: &str, dataset: &str, name: &str) -> DbResult<()>;

    async fn delete_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<()>;

    async fn update_dataset_metadata(
        &self,
        project: &str,
        dataset: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()>;

    async fn update_table_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()>;

    async fn update_routine_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()>;
}
