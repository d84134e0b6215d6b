//! In-memory warehouse used by tests
//!
//! Holds datasets, tables, routines and models behind the [`Warehouse`]
//! trait, records every submitted job configuration and every deletion, and
//! replays queued job outcomes in FIFO order.

use crate::error::{DbError, DbResult};
use crate::traits::Warehouse;
use crate::types::{
    DatasetInfo, JobMetadata, JobStatistics, ModelInfo, QueryJobConfig, ResourceMetadata,
    RoutineInfo, TableInfo,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockDataset {
    metadata: ResourceMetadata,
    tables: BTreeMap<String, TableInfo>,
    routines: BTreeMap<String, RoutineInfo>,
    models: BTreeMap<String, ModelInfo>,
}

#[derive(Debug, Default)]
struct MockState {
    datasets: BTreeMap<String, MockDataset>,
    queued_jobs: VecDeque<JobMetadata>,
    child_jobs: BTreeMap<String, Vec<JobMetadata>>,
    submitted: Vec<QueryJobConfig>,
    deleted: Vec<String>,
    fail_deletes: bool,
    job_counter: usize,
}

/// In-memory [`Warehouse`] implementation.
pub struct MockWarehouse {
    project: String,
    state: Mutex<MockState>,
}

fn lock(mutex: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found(resource: impl Into<String>) -> DbError {
    DbError::NotFound {
        resource: resource.into(),
    }
}

impl MockWarehouse {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn add_dataset(&self, dataset: &str) {
        lock(&self.state).datasets.entry(dataset.to_string()).or_default();
    }

    pub fn add_dataset_with(&self, dataset: &str, metadata: ResourceMetadata) {
        let mut state = lock(&self.state);
        state.datasets.entry(dataset.to_string()).or_default().metadata = metadata;
    }

    pub fn add_table(&self, dataset: &str, name: &str) {
        self.add_table_with(dataset, name, ResourceMetadata::default());
    }

    pub fn add_table_with(&self, dataset: &str, name: &str, metadata: ResourceMetadata) {
        let info = TableInfo {
            project: self.project.clone(),
            dataset: dataset.to_string(),
            name: name.to_string(),
            view_query: None,
            metadata,
        };
        let mut state = lock(&self.state);
        state
            .datasets
            .entry(dataset.to_string())
            .or_default()
            .tables
            .insert(name.to_string(), info);
    }

    pub fn add_routine(&self, dataset: &str, name: &str) {
        let info = RoutineInfo {
            project: self.project.clone(),
            dataset: dataset.to_string(),
            name: name.to_string(),
            metadata: ResourceMetadata::default(),
        };
        let mut state = lock(&self.state);
        state
            .datasets
            .entry(dataset.to_string())
            .or_default()
            .routines
            .insert(name.to_string(), info);
    }

    pub fn add_model(&self, dataset: &str, name: &str) {
        let info = ModelInfo {
            project: self.project.clone(),
            dataset: dataset.to_string(),
            name: name.to_string(),
            metadata: ResourceMetadata::default(),
        };
        let mut state = lock(&self.state);
        state
            .datasets
            .entry(dataset.to_string())
            .or_default()
            .models
            .insert(name.to_string(), info);
    }

    /// Queue the outcome returned by the next `run_query_job` call.
    pub fn queue_job(&self, job: JobMetadata) {
        lock(&self.state).queued_jobs.push_back(job);
    }

    pub fn add_child_jobs(&self, parent_job_id: &str, children: Vec<JobMetadata>) {
        lock(&self.state)
            .child_jobs
            .insert(parent_job_id.to_string(), children);
    }

    /// Make every delete fail with an RPC error.
    pub fn fail_deletes(&self) {
        lock(&self.state).fail_deletes = true;
    }

    /// Every job configuration submitted so far.
    pub fn submitted(&self) -> Vec<QueryJobConfig> {
        lock(&self.state).submitted.clone()
    }

    /// `KIND:qualified-id` entries for every successful deletion.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.state).deleted.clone()
    }

    fn default_job(state: &mut MockState, dry_run: bool) -> JobMetadata {
        state.job_counter += 1;
        JobMetadata {
            id: format!("mock-job-{}", state.job_counter),
            statement_type: if dry_run { None } else { Some("SCRIPT".to_string()) },
            statistics: Some(JobStatistics {
                total_bytes_processed: Some(if dry_run { 1_048_576 } else { 0 }),
                start_time: None,
                end_time: None,
            }),
            ..JobMetadata::default()
        }
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    fn project_id(&self) -> String {
        self.project.clone()
    }

    async fn run_query_job(&self, config: &QueryJobConfig) -> DbResult<JobMetadata> {
        let mut state = lock(&self.state);
        state.submitted.push(config.clone());
        if let Some(queued) = state.queued_jobs.pop_front() {
            return Ok(queued);
        }
        let dry_run = config.dry_run;
        Ok(Self::default_job(&mut state, dry_run))
    }

    async fn list_child_jobs(&self, parent_job_id: &str) -> DbResult<Vec<JobMetadata>> {
        Ok(lock(&self.state)
            .child_jobs
            .get(parent_job_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_dataset(&self, project: &str, dataset: &str) -> DbResult<DatasetInfo> {
        let state = lock(&self.state);
        let ds = state
            .datasets
            .get(dataset)
            .ok_or_else(|| not_found(format!("{project}.{dataset}")))?;
        Ok(DatasetInfo {
            project: project.to_string(),
            dataset: dataset.to_string(),
            metadata: ds.metadata.clone(),
        })
    }

    async fn get_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<TableInfo> {
        let state = lock(&self.state);
        state
            .datasets
            .get(dataset)
            .and_then(|ds| ds.tables.get(name))
            .cloned()
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))
    }

    async fn get_routine(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
    ) -> DbResult<RoutineInfo> {
        let state = lock(&self.state);
        state
            .datasets
            .get(dataset)
            .and_then(|ds| ds.routines.get(name))
            .cloned()
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))
    }

    async fn get_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<ModelInfo> {
        let state = lock(&self.state);
        state
            .datasets
            .get(dataset)
            .and_then(|ds| ds.models.get(name))
            .cloned()
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))
    }

    async fn table_exists(&self, _project: &str, dataset: &str, name: &str) -> DbResult<bool> {
        let state = lock(&self.state);
        Ok(state
            .datasets
            .get(dataset)
            .is_some_and(|ds| ds.tables.contains_key(name)))
    }

    async fn list_tables(&self, _project: &str, dataset: &str) -> DbResult<Vec<TableInfo>> {
        let state = lock(&self.state);
        Ok(state
            .datasets
            .get(dataset)
            .map(|ds| ds.tables.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_routines(&self, _project: &str, dataset: &str) -> DbResult<Vec<RoutineInfo>> {
        let state = lock(&self.state);
        Ok(state
            .datasets
            .get(dataset)
            .map(|ds| ds.routines.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_models(&self, _project: &str, dataset: &str) -> DbResult<Vec<ModelInfo>> {
        let state = lock(&self.state);
        Ok(state
            .datasets
            .get(dataset)
            .map(|ds| ds.models.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_view(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        view_query: &str,
    ) -> DbResult<TableInfo> {
        let info = TableInfo {
            project: project.to_string(),
            dataset: dataset.to_string(),
            name: name.to_string(),
            view_query: Some(view_query.to_string()),
            metadata: ResourceMetadata::default(),
        };
        let mut state = lock(&self.state);
        state
            .datasets
            .entry(dataset.to_string())
            .or_default()
            .tables
            .insert(name.to_string(), info.clone());
        Ok(info)
    }

    async fn delete_table(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        let mut state = lock(&self.state);
        if state.fail_deletes {
            return Err(DbError::Rpc {
                message: "injected delete failure".to_string(),
            });
        }
        state
            .datasets
            .get_mut(dataset)
            .and_then(|ds| ds.tables.remove(name))
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))?;
        state.deleted.push(format!("TABLE:{project}.{dataset}.{name}"));
        Ok(())
    }

    async fn delete_routine(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        let mut state = lock(&self.state);
        if state.fail_deletes {
            return Err(DbError::Rpc {
                message: "injected delete failure".to_string(),
            });
        }
        state
            .datasets
            .get_mut(dataset)
            .and_then(|ds| ds.routines.remove(name))
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))?;
        state
            .deleted
            .push(format!("ROUTINE:{project}.{dataset}.{name}"));
        Ok(())
    }

    async fn delete_model(&self, project: &str, dataset: &str, name: &str) -> DbResult<()> {
        let mut state = lock(&self.state);
        if state.fail_deletes {
            return Err(DbError::Rpc {
                message: "injected delete failure".to_string(),
            });
        }
        state
            .datasets
            .get_mut(dataset)
            .and_then(|ds| ds.models.remove(name))
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))?;
        state.deleted.push(format!("MODEL:{project}.{dataset}.{name}"));
        Ok(())
    }

    async fn update_dataset_metadata(
        &self,
        project: &str,
        dataset: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        let mut state = lock(&self.state);
        let ds = state
            .datasets
            .get_mut(dataset)
            .ok_or_else(|| not_found(format!("{project}.{dataset}")))?;
        ds.metadata = metadata.clone();
        Ok(())
    }

    async fn update_table_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        let mut state = lock(&self.state);
        let table = state
            .datasets
            .get_mut(dataset)
            .and_then(|ds| ds.tables.get_mut(name))
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))?;
        table.metadata = metadata.clone();
        Ok(())
    }

    async fn update_routine_metadata(
        &self,
        project: &str,
        dataset: &str,
        name: &str,
        metadata: &ResourceMetadata,
    ) -> DbResult<()> {
        let mut state = lock(&self.state);
        let routine = state
            .datasets
            .get_mut(dataset)
            .and_then(|ds| ds.routines.get_mut(name))
            .ok_or_else(|| not_found(format!("{project}.{dataset}.{name}")))?;
        routine.metadata = metadata.clone();
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
