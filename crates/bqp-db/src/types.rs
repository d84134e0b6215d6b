//! Wire types for query jobs and warehouse resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query job scheduling priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobPriority {
    Interactive,
    Batch,
}

/// Value of a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Int(i64),
    String(String),
}

/// A named or positional query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    /// `None` for positional parameters
    pub name: Option<String>,
    pub value: ParamValue,
}

/// Configuration for one query job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryJobConfig {
    pub query: String,
    pub dry_run: bool,
    pub priority: JobPriority,
    pub labels: BTreeMap<String, String>,
    pub job_prefix: Option<String>,
    pub maximum_bytes_billed: Option<i64>,
    pub params: Vec<QueryParam>,
}

impl QueryJobConfig {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            dry_run: false,
            priority: JobPriority::Batch,
            labels: BTreeMap::new(),
            job_prefix: None,
            maximum_bytes_billed: None,
            params: Vec::new(),
        }
    }
}

/// Resource a DDL job acted on, as reported in job statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRef {
    pub project: String,
    pub dataset: String,
    pub name: String,
}

impl TargetRef {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            name: name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.name)
    }
}

/// Terminal error of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub message: String,
}

/// Execution statistics of a completed (or dry-run) job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatistics {
    pub total_bytes_processed: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobStatistics {
    /// Wall-clock duration of the job, when both timestamps are present.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }
}

/// Metadata of a completed query job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobMetadata {
    pub id: String,
    pub statement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl_target_table: Option<TargetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl_target_routine: Option<TargetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_result: Option<JobError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatistics>,
}

/// Description of one column, mirrored into `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Synchronizable metadata of a resource: description, labels, and (for
/// tables) column descriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnMetadata>,
}

/// A dataset as fetched from the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub project: String,
    pub dataset: String,
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

impl DatasetInfo {
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.project, self.dataset)
    }
}

/// A table or view as fetched from the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub project: String,
    pub dataset: String,
    pub name: String,
    /// Defining query for views, `None` for plain tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_query: Option<String>,
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

impl TableInfo {
    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.name)
    }
}

/// A routine (function or procedure) as fetched from the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineInfo {
    pub project: String,
    pub dataset: String,
    pub name: String,
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

impl RoutineInfo {
    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.name)
    }
}

/// A model as fetched from the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub project: String,
    pub dataset: String,
    pub name: String,
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

impl ModelInfo {
    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.name)
    }
}
