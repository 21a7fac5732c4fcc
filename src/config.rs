use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

// Filter values are substituted into JQL verbatim, so the allowed
// character set excludes quotes, commas, parentheses and other JQL
// metacharacters.
static RE_PROJECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());
static RE_FILTER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._/-]*$").unwrap());

/// One reported project: the Jira key plus the display name used in tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    pub key: String,
    pub name: String,
}

/// The configured enumerations driving the query fan-out. Order is
/// preserved end to end and determines table row order.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryFilters {
    pub issue_types: Vec<String>,
    pub release_types: Vec<String>,
    pub release_windows: Vec<String>,
}

/// Connection settings for the Atlassian site hosting Jira and Confluence.
#[derive(Debug, Clone, Deserialize)]
pub struct AtlassianConfig {
    /// Base URL, e.g. `https://example.atlassian.net`.
    pub url: String,
    /// Confluence space key the report page lives in.
    pub space: String,
    /// Parent page id newly created monthly pages are filed under.
    pub parent_page_id: String,
    /// Environment variable holding the Atlassian account name.
    #[serde(default = "default_username_env")]
    pub username_env: String,
    /// Environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Optional HTML fragment prepended to the page body.
    #[serde(default)]
    pub intro_html: Option<String>,
}

fn default_username_env() -> String {
    "ATLASSIAN_USERNAME".to_string()
}

fn default_token_env() -> String {
    "ATLASSIAN_TOKEN".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub projects: Vec<ProjectEntry>,
    pub filters: QueryFilters,
    pub atlassian: AtlassianConfig,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default locations: `./config.yaml`, then
    /// `~/.relmetrics/config.yaml`.
    pub fn load_default() -> Result<Self> {
        for path in default_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(Error::Config(
            "no config file found; pass --config or create ./config.yaml".to_string(),
        ))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !RE_PROJECT_KEY.is_match(&project.key) {
                return Err(Error::Config(format!(
                    "invalid project key: {:?}",
                    project.key
                )));
            }
            if !seen.insert(project.key.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate project key: {}",
                    project.key
                )));
            }
        }

        for (field, values) in [
            ("filters.issue_types", &self.filters.issue_types),
            ("filters.release_types", &self.filters.release_types),
            ("filters.release_windows", &self.filters.release_windows),
        ] {
            if values.is_empty() {
                return Err(Error::Config(format!("{field} must not be empty")));
            }
            for value in values {
                if !RE_FILTER_LABEL.is_match(value) {
                    return Err(Error::Config(format!(
                        "invalid value in {field}: {value:?}"
                    )));
                }
            }
        }

        if self.atlassian.url.trim().is_empty() {
            return Err(Error::Config("atlassian.url must not be empty".to_string()));
        }
        if self.atlassian.space.trim().is_empty() {
            return Err(Error::Config(
                "atlassian.space must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config.yaml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".relmetrics").join("config.yaml"));
    }
    paths
}

/// Atlassian credentials, resolved from the environment variables the
/// config names. Never stored in the config file itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn from_env(config: &AtlassianConfig) -> Result<Self> {
        let username = env::var(&config.username_env).map_err(|_| {
            Error::Config(format!("environment variable {} not set", config.username_env))
        })?;
        let token = env::var(&config.token_env).map_err(|_| {
            Error::Config(format!("environment variable {} not set", config.token_env))
        })?;
        Ok(Self { username, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GOOD_YAML: &str = r#"
projects:
  - key: ENG
    name: Engine
  - key: UI
    name: Interface
filters:
  issue_types: [Bug, Story, Empty]
  release_types: [Major, Minor, Patch]
  release_windows: [Planned, Unplanned]
atlassian:
  url: https://example.atlassian.net
  space: REL
  parent_page_id: "12345"
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_good_config() {
        let file = write_temp(GOOD_YAML);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.projects.len(), 2);
        assert_eq!(config.projects[0].key, "ENG");
        assert_eq!(config.projects[0].name, "Engine");
        assert_eq!(config.filters.release_types, ["Major", "Minor", "Patch"]);
        assert_eq!(config.atlassian.username_env, "ATLASSIAN_USERNAME");
        assert_eq!(config.atlassian.token_env, "ATLASSIAN_TOKEN");
        assert!(config.atlassian.intro_html.is_none());
    }

    #[test]
    fn test_project_order_preserved() {
        let file = write_temp(GOOD_YAML);
        let config = Config::load(file.path()).unwrap();
        let keys: Vec<&str> = config.projects.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["ENG", "UI"]);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_metacharacters_in_labels() {
        let bad = GOOD_YAML.replace("Major", "Major\" OR key = \"X");
        let file = write_temp(&bad);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("release_types"));
    }

    #[test]
    fn test_rejects_bad_project_key() {
        let bad = GOOD_YAML.replace("key: ENG", "key: \"ENG)\"");
        let file = write_temp(&bad);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_project_key() {
        let bad = GOOD_YAML.replace("key: UI", "key: ENG");
        let file = write_temp(&bad);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_empty_enumeration() {
        let bad = GOOD_YAML.replace("issue_types: [Bug, Story, Empty]", "issue_types: []");
        let file = write_temp(&bad);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("issue_types"));
    }
}
