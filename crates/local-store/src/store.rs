use crate::{parse, scan};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracelens_core::source::{
    AgentMapping, LogLine, LogPage, SessionSource, SessionSummary, SourceError,
};
use tracelens_core::TranscriptEvent;

/// Disk-backed session source.
///
/// Sessions live under `<projects_dir>/<project>/<session>.jsonl`, with
/// subagent logs at `<projects_dir>/<project>/<session>/subagents/*.jsonl`.
/// Every query re-discovers from disk; the directory tree is small compared
/// to the log files themselves and this keeps listings fresh while sessions
/// are still being written.
pub struct LocalStore {
    projects_dir: PathBuf,
}

impl LocalStore {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    fn discover(&self) -> Result<Vec<SessionSummary>, SourceError> {
        let mut sessions = Vec::new();
        if !self.projects_dir.is_dir() {
            return Ok(sessions);
        }

        for path in self.matching("*/*.jsonl")? {
            let project = dir_name(path.parent());
            match summarize_file(&path, &project, None) {
                Ok(summary) => sessions.push(summary),
                Err(e) => tracing::warn!("failed to scan {}: {e}", path.display()),
            }
        }

        for path in self.matching("*/*/subagents/*.jsonl")? {
            let session_dir = path.parent().and_then(Path::parent);
            let parent_session = dir_name(session_dir);
            let project = dir_name(session_dir.and_then(Path::parent));
            match summarize_file(&path, &project, Some(&parent_session)) {
                Ok(summary) => sessions.push(summary),
                Err(e) => tracing::warn!("failed to scan {}: {e}", path.display()),
            }
        }

        // Most recently updated first.
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    fn matching(&self, pattern: &str) -> Result<Vec<PathBuf>, SourceError> {
        let pattern = self.projects_dir.join(pattern);
        let paths = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| SourceError::Malformed {
                message: format!("bad discovery pattern: {e}"),
            })?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("unreadable path during discovery: {e}");
                    None
                }
            })
            .collect();
        Ok(paths)
    }

    fn find(&self, id: &str) -> Result<SessionSummary, SourceError> {
        self.discover()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SourceError::NotFound { id: id.to_string() })
    }

    fn path_of(&self, id: &str) -> Result<PathBuf, SourceError> {
        let summary = self.find(id)?;
        summary
            .file_path
            .map(PathBuf::from)
            .ok_or_else(|| SourceError::NotFound { id: id.to_string() })
    }
}

impl SessionSource for LocalStore {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SourceError> {
        self.discover()
    }

    async fn session_info(&self, id: &str) -> Result<SessionSummary, SourceError> {
        self.find(id)
    }

    async fn log_lines(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<LogPage, SourceError> {
        let path = self.path_of(id)?;
        let file = std::fs::File::open(&path)?;
        let reader = std::io::BufReader::new(file);

        let mut lines = Vec::new();
        let mut total_lines = 0usize;
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            total_lines += 1;
            if line_number >= offset && line_number < offset + limit {
                lines.push(LogLine {
                    line_number,
                    content: line,
                });
            }
        }

        Ok(LogPage { lines, total_lines })
    }

    async fn raw_log(&self, id: &str) -> Result<String, SourceError> {
        let path = self.path_of(id)?;
        Ok(std::fs::read_to_string(path)?)
    }

    async fn transcript(&self, id: &str) -> Result<Vec<TranscriptEvent>, SourceError> {
        let path = self.path_of(id)?;
        let file = std::fs::File::open(&path)?;
        Ok(parse::parse_transcript(std::io::BufReader::new(file)))
    }

    async fn agent_map(&self, id: &str) -> Result<Vec<AgentMapping>, SourceError> {
        let path = self.path_of(id)?;
        let file = std::fs::File::open(&path)?;
        let reader = std::io::BufReader::new(file);

        let mut mappings: Vec<AgentMapping> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.contains(r#""type":"progress""#) {
                continue;
            }
            let tool_use_id = scan::extract_json_string(&line, "toolUseID")
                .or_else(|| scan::extract_json_string(&line, "toolUseId"));
            let agent_id = scan::extract_json_string(&line, "agentId");
            let (Some(tool_use_id), Some(agent_id)) = (tool_use_id, agent_id) else {
                continue;
            };
            // First progress record per tool use wins.
            if mappings.iter().all(|m| m.tool_use_id != tool_use_id) {
                mappings.push(AgentMapping {
                    tool_use_id,
                    agent_id,
                });
            }
        }
        Ok(mappings)
    }
}

fn dir_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn summarize_file(
    path: &Path,
    project: &str,
    parent_session: Option<&str>,
) -> std::io::Result<SessionSummary> {
    let meta = scan::scan_metadata(path)?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();
    let agent_id = parent_session.map(|_| {
        id.strip_prefix("agent-").unwrap_or(&id).to_string()
    });

    Ok(SessionSummary {
        id,
        project: project.to_string(),
        slug: meta.slug,
        created_at: meta.first_timestamp,
        updated_at: meta.last_timestamp,
        line_count: meta.line_count,
        first_message: meta.first_message,
        project_path: meta.project_path,
        file_path: Some(path.to_string_lossy().into_owned()),
        is_sidechain: parent_session.is_some(),
        parent_session_id: parent_session.map(str::to_string),
        agent_id,
    })
}
