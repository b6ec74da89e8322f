//! Config-file project source: the external-collaborator stub that feeds
//! the engine. Projects (and their worktrees) come from a JSON file; real
//! deployments would plug a discovery service into the same trait.

use projmux_core::{Project, ProjectSource, Worktree};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ProjectsFile {
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    name: String,
    path: PathBuf,
    #[serde(default)]
    parent_repo: Option<PathBuf>,
    #[serde(default)]
    worktrees: Vec<WorktreeEntry>,
}

#[derive(Debug, Deserialize)]
struct WorktreeEntry {
    id: String,
    path: PathBuf,
    #[serde(default)]
    branch: Option<String>,
}

/// `ProjectSource` backed by a JSON file, re-read on every cycle so edits
/// show up without a restart.
pub struct ConfigProjectSource {
    path: PathBuf,
}

impl ConfigProjectSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProjectSource for ConfigProjectSource {
    fn list_projects(&self) -> Result<Vec<Project>, Box<dyn std::error::Error + Send + Sync>> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("reading {}: {e}", self.path.display()))?;
        parse_projects(&raw).map_err(Into::into)
    }
}

fn parse_projects(raw: &str) -> Result<Vec<Project>, String> {
    let file: ProjectsFile =
        serde_json::from_str(raw).map_err(|e| format!("invalid projects file: {e}"))?;

    let mut projects = Vec::with_capacity(file.projects.len());
    for entry in file.projects {
        let mut project = Project::new(entry.name, expand_tilde(&entry.path));
        project.parent_repo_path = entry.parent_repo.as_deref().map(expand_tilde);
        for wt in entry.worktrees {
            let branch = wt.branch.unwrap_or_else(|| wt.id.clone());
            project.worktrees.push(Worktree {
                id: wt.id,
                path: expand_tilde(&wt.path),
                branch,
            });
        }
        projects.push(project);
    }
    Ok(projects)
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = s.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    path.to_path_buf()
}
