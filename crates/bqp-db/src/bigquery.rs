//! BigQuery REST backend stub
//!
//! Placeholder for the hosted client. Planning, bundling and the full test
//! suite run against [`MockWarehouse`](crate::mock::MockWarehouse); this
//! backend exists so the binary wires up the same way once a real client
//! lands.

use crate::error::{DbError, DbResult};
use crate::traits::Warehouse;
use crate::types::{
    DatasetInfo, JobMetadata, ModelInfo, QueryJobConfig, ResourceMetadata, RoutineInfo, TableInfo,
};
use async_trait::async_trait;

/// BigQuery REST backend (stub implementation)
pub struct BigQueryBackend {
    project: String,
}

fn unimplemented(feature: &str) -> DbError {
    DbError::NotImplemented {
        backend: "bigquery".to_string(),
        feature: feature.to_string(),
    }
}

impl BigQueryBackend {
    /// Create a new BigQuery backend (not yet implemented)
    pub fn connect(_project: Option<&str>) -> DbResult<Self> {
        Err(unimplemented("connection"))
    }
}

#[async_trait]
impl Warehouse for BigQueryBackend {
    fn project_id(&self) -> String {
        self.project.clone()
    }

    async fn run_query_job(&self, _config: &QueryJobConfig) -> DbResult<JobMetadata> {
        Err(unimplemented("run_query_job"))
    }

    async fn list_child_jobs(&self, _parent_job_id: &str) -> DbResult<Vec<JobMetadata>> {
        Err(unimplemented("list_child_jobs"))
    }

    async fn get_dataset(&self, _project: &str, _dataset: &str) -> DbResult<DatasetInfo> {
        Err(unimplemented("get_dataset"))
    }

    async fn get_table(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<TableInfo> {
        Err(unimplemented("get_table"))
    }

    async fn get_routine(
        &self,
        _project: &str,
        _dataset: &str,
        _name: &str,
    ) -> DbResult<RoutineInfo> {
        Err(unimplemented("get_routine"))
    }

    async fn get_model(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<ModelInfo> {
        Err(unimplemented("get_model"))
    }

    async fn table_exists(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<bool> {
        Err(unimplemented("table_exists"))
    }

    async fn list_tables(&self, _project: &str, _dataset: &str) -> DbResult<Vec<TableInfo>> {
        Err(unimplemented("list_tables"))
    }

    async fn list_routines(&self, _project: &str, _dataset: &str) -> DbResult<Vec<RoutineInfo>> {
        Err(unimplemented("list_routines"))
    }

    async fn list_models(&self, _project: &str, _dataset: &str) -> DbResult<Vec<ModelInfo>> {
        Err(unimplemented("list_models"))
    }

    async fn create_view(
        &self,
        _project: &str,
        _dataset: &str,
        _name: &str,
        _view_query: &str,
    ) -> DbResult<TableInfo> {
        Err(unimplemented("create_view"))
    }

    async fn delete_table(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<()> {
        Err(unimplemented("delete_table"))
    }

    async fn delete_routine(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<()> {
        Err(unimplemented("delete_routine"))
    }

    async fn delete_model(&self, _project: &str, _dataset: &str, _name: &str) -> DbResult<()> {
        Err(unimplemented("delete_model"))
    }

    async fn update_dataset_metadata(
        &self,
        _project: &str,
        _dataset: &str,
        _metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        Err(unimplemented("update_dataset_metadata"))
    }

    async fn update_table_metadata(
        &self,
        _project: &str,
        _dataset: &str,
        _name: &str,
        _metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        Err(unimplemented("update_table_metadata"))
    }

    async fn update_routine_metadata(
        &self,
        _project: &str,
        _dataset: &str,
        _name: &str,
        _metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        Err(unimplemented("update_routine_metadata"))
    }
}
