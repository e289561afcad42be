use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "tracelens.toml";
const CONFIG_DIR: &str = "~/.config/tracelens";
const DEFAULT_PROJECTS_DIR: &str = "~/.claude/projects";

/// On-disk configuration (`~/.config/tracelens/tracelens.toml`). Every field
/// is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub projects_dir: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Resolved configuration after merging the config file and CLI overrides.
#[derive(Debug, Clone)]
pub struct Config {
    pub projects_dir: PathBuf,
    pub page_size: usize,
}

pub fn load(projects_dir_override: Option<PathBuf>) -> Result<Config> {
    let file = read_file_config()?;
    Ok(resolve(file, projects_dir_override))
}

fn resolve(file: FileConfig, projects_dir_override: Option<PathBuf>) -> Config {
    let projects_dir = projects_dir_override.unwrap_or_else(|| {
        expand(file.projects_dir.as_deref().unwrap_or(DEFAULT_PROJECTS_DIR))
    });
    Config {
        projects_dir,
        page_size: file
            .page_size
            .filter(|&n| n > 0)
            .unwrap_or(tracelens_logview::DEFAULT_PAGE_SIZE),
    }
}

fn read_file_config() -> Result<FileConfig> {
    let path = expand(CONFIG_DIR).join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(FileConfig::default());
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
