//! Resource identifiers and the path <-> identifier mapping
//!
//! The on-disk layout is normative:
//!
//! ```text
//! <root>/<project-or-@default>/<dataset>/[<resource>]/<file>
//! ```
//!
//! `@default` in the project position denotes the client's ambient project
//! and is substituted during mapping. A `@routines` or `@models` segment
//! qualifies the resource kind; its absence implies a table or view. A file
//! directly inside the dataset directory targets the dataset itself.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path segment standing in for the client's ambient project.
pub const DEFAULT_PROJECT: &str = "@default";

/// Path segment introducing routine resources.
pub const ROUTINES_SEGMENT: &str = "@routines";

/// Path segment introducing model resources.
pub const MODELS_SEGMENT: &str = "@models";

/// Kind of a warehouse resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Schema,
    Table,
    View,
    MaterializedView,
    Routine,
    Model,
}

impl ResourceKind {
    /// Uppercase wire/reporting form of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Schema => "SCHEMA",
            ResourceKind::Table => "TABLE",
            ResourceKind::View => "VIEW",
            ResourceKind::MaterializedView => "MATERIALIZED_VIEW",
            ResourceKind::Routine => "ROUTINE",
            ResourceKind::Model => "MODEL",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-qualified identifier of a warehouse resource.
///
/// `name` is `None` for dataset-scoped identifiers (kind [`ResourceKind::Schema`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub project: String,
    pub dataset: String,
    pub name: Option<String>,
    pub kind: ResourceKind,
}

impl ResourceId {
    /// Identifier of a dataset (schema) itself.
    pub fn dataset(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            name: None,
            kind: ResourceKind::Schema,
        }
    }

    /// Identifier of a named resource inside a dataset.
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        name: impl Into<String>,
        kind: ResourceKind,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            name: Some(name.into()),
            kind,
        }
    }

    /// Canonical dotted form: `project.dataset` or `project.dataset.name`.
    pub fn qualified(&self) -> String {
        match &self.name {
            Some(name) => format!("{}.{}.{}", self.project, self.dataset, name),
            None => format!("{}.{}", self.project, self.dataset),
        }
    }

    /// Identifier of the dataset containing this resource.
    pub fn parent_dataset(&self) -> ResourceId {
        ResourceId::dataset(self.project.clone(), self.dataset.clone())
    }

    /// True for dataset-scoped identifiers.
    pub fn is_dataset(&self) -> bool {
        self.name.is_none()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidPath {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Map a file path under `root` to the resource identifier it addresses.
///
/// `default_project` replaces a literal `@default` project segment; SQL-level
/// identifiers are never searched for `@default` (that substitution applies
/// to paths only).
pub fn path_to_id(path: &Path, root: &Path, default_project: &str) -> CoreResult<ResourceId> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| invalid(path, format!("not under root '{}'", root.display())))?;

    let segments: Vec<&str> = rel
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| invalid(path, "path segment is not valid UTF-8"))
        })
        .collect::<CoreResult<_>>()?;

    // project, dataset and the file name itself at minimum
    if segments.len() < 3 {
        return Err(invalid(path, "expected <project>/<dataset>/.../<file>"));
    }

    let project = if segments[0] == DEFAULT_PROJECT {
        default_project.to_string()
    } else {
        segments[0].to_string()
    };
    let dataset = segments[1].to_string();
    if dataset.starts_with('@') {
        return Err(invalid(path, "dataset segment must not start with '@'"));
    }

    let middle = &segments[2..segments.len() - 1];
    match middle {
        [] => Ok(ResourceId::dataset(project, dataset)),
        [resource] if !resource.starts_with('@') => Ok(ResourceId::new(
            project,
            dataset,
            *resource,
            ResourceKind::Table,
        )),
        [special, name] if *special == ROUTINES_SEGMENT => Ok(ResourceId::new(
            project,
            dataset,
            *name,
            ResourceKind::Routine,
        )),
        [special, name] if *special == MODELS_SEGMENT => {
            Ok(ResourceId::new(project, dataset, *name, ResourceKind::Model))
        }
        _ => Err(invalid(path, "unrecognized directory structure")),
    }
}

/// Directory that holds the files of `id`, inverse of the directory part of
/// [`path_to_id`]. A project equal to `default_project` is rendered as the
/// `@default` segment.
pub fn id_to_dir(id: &ResourceId, root: &Path, default_project: &str) -> PathBuf {
    let project = if id.project == default_project {
        DEFAULT_PROJECT
    } else {
        id.project.as_str()
    };
    let mut dir = root.join(project).join(&id.dataset);
    if let Some(name) = &id.name {
        match id.kind {
            ResourceKind::Routine => dir = dir.join(ROUTINES_SEGMENT).join(name),
            ResourceKind::Model => dir = dir.join(MODELS_SEGMENT).join(name),
            _ => dir = dir.join(name),
        }
    }
    dir
}

/// Normalize a dotted SQL identifier into its canonical qualified form.
///
/// BigQuery backtick-quoted identifiers keep their internal dots and are
/// split the same way. A missing project is padded with `ambient_project`.
/// Schema-only references keep two segments; everything else keeps three. A
/// one-segment non-schema reference cannot name a resource and is rejected.
pub fn normalize_ident(
    ident: &str,
    ambient_project: &str,
    schema_only: bool,
) -> CoreResult<String> {
    let trimmed = ident.trim().trim_matches('`');
    let parts: Vec<&str> = trimmed
        .split('.')
        .map(|p| p.trim().trim_matches('`'))
        .collect();

    if parts.iter().any(|p| p.is_empty()) {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: "empty identifier segment".to_string(),
        });
    }

    if schema_only {
        match parts.as_slice() {
            [dataset] => Ok(format!("{}.{}", ambient_project, dataset)),
            [project, dataset] => Ok(format!("{}.{}", project, dataset)),
            _ => Err(CoreError::InvalidIdentifier {
                ident: ident.to_string(),
                reason: "schema reference has too many segments".to_string(),
            }),
        }
    } else {
        match parts.as_slice() {
            [_] => Err(CoreError::InvalidIdentifier {
                ident: ident.to_string(),
                reason: "missing dataset qualifier".to_string(),
            }),
            [dataset, name] => Ok(format!("{}.{}.{}", ambient_project, dataset, name)),
            [project, dataset, name] => Ok(format!("{}.{}.{}", project, dataset, name)),
            _ => Err(CoreError::InvalidIdentifier {
                ident: ident.to_string(),
                reason: "too many segments".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "resource_test.rs"]
mod tests;
