//! Project resolution
//!
//! The bridge never manages projects itself. It only needs to turn the
//! caller's project id into a working directory for the runtime, and it
//! rejects the request before starting anything when that fails.

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolves a project id to the directory a session runs in
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, project_id: &str) -> Result<PathBuf>;
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    id: String,
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectsFile {
    List(Vec<ProjectEntry>),
    Wrapped { projects: Vec<ProjectEntry> },
}

/// Project registry read from the dashboard's JSON projects file
///
/// The file is re-read on every lookup so that projects added by the CRUD
/// layer are visible without a restart.
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, PathBuf>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "Projects file not found");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        let entries = match serde_json::from_str::<ProjectsFile>(&content)? {
            ProjectsFile::List(entries) | ProjectsFile::Wrapped { projects: entries } => entries,
        };
        Ok(entries.into_iter().map(|p| (p.id, p.path)).collect())
    }
}

#[async_trait]
impl ProjectResolver for JsonProjectStore {
    async fn resolve(&self, project_id: &str) -> Result<PathBuf> {
        let projects = self.load().await?;
        let path = projects
            .get(project_id)
            .ok_or_else(|| BridgeError::UnknownProject {
                project_id: project_id.to_string(),
                reason: "not registered".to_string(),
            })?;
        ensure_directory(project_id, path).await?;
        Ok(path.clone())
    }
}

/// Fixed in-memory project map
#[derive(Debug, Default, Clone)]
pub struct StaticProjects {
    projects: HashMap<String, PathBuf>,
}

impl StaticProjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, project_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.projects.insert(project_id.into(), path.into());
        self
    }
}

#[async_trait]
impl ProjectResolver for StaticProjects {
    async fn resolve(&self, project_id: &str) -> Result<PathBuf> {
        self.projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| BridgeError::UnknownProject {
                project_id: project_id.to_string(),
                reason: "not registered".to_string(),
            })
    }
}

async fn ensure_directory(project_id: &str, path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BridgeError::UnknownProject {
            project_id: project_id.to_string(),
            reason: format!("{} is not a directory", path.display()),
        }),
        Err(e) => Err(BridgeError::UnknownProject {
            project_id: project_id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        }),
    }
}
