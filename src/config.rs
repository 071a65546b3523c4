use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::catalog::{QueryCatalog, SavedQuery};
use crate::error::{Result, TixError};

pub const DEFAULT_FIELDS: &str = "summary,created,updated,priority,status,reporter,assignee";
pub const DEFAULT_SORT: &str = "priority asc, created";
pub const DEFAULT_MAX_RESULTS: u32 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub endpoint: Option<String>,
    pub user: Option<String>,
    pub project: Option<String>,
    pub token_env: Option<String>,
    pub token_command: Option<String>,
    pub fields: String,
    pub sort: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            user: None,
            project: None,
            token_env: Some("JIRA_API_TOKEN".to_string()),
            token_command: None,
            fields: DEFAULT_FIELDS.to_string(),
            sort: DEFAULT_SORT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl JiraConfig {
    /// Endpoint after applying `JIRA_ENDPOINT` and a command-line override.
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> Result<String> {
        let env = std::env::var("JIRA_ENDPOINT").ok().filter(|e| !e.is_empty());
        pick_endpoint(cli_override, env.as_deref(), self.endpoint.as_deref())
    }

    /// Configured user, falling back to `$USER`.
    pub fn resolve_user(&self) -> Option<String> {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|u| !u.is_empty())
    }
}

fn pick_endpoint(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> Result<String> {
    cli.or(env)
        .or(file)
        .map(|e| e.trim_end_matches('/').to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            TixError::Config(
                "no Jira endpoint configured; set [jira].endpoint, JIRA_ENDPOINT or --endpoint"
                    .to_string(),
            )
        })
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub queries: Vec<SavedQuery>,
}

pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("tix"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load from the default location, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparsable config");
                Config::default()
            }
        }
    }

    /// Load an explicitly requested file. Unlike [`Config::load`], problems are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TixError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| TixError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn catalog(&self) -> QueryCatalog {
        if self.queries.is_empty() {
            QueryCatalog::defaults(self.jira.project.as_deref())
        } else {
            QueryCatalog::new(self.queries.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[jira]
endpoint = "https://example.atlassian.net/"
user = "me@example.com"
project = "OPS"
token_env = "MY_TOKEN"
token_command = "pass show jira"
sort = "updated desc"
max_results = 50
timeout_secs = 5

[[queries]]
name = "Mine"
jql = "assignee = currentUser()"

[[queries]]
name = "Everything"
jql = "resolution = Unresolved"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.jira.user.as_deref(), Some("me@example.com"));
        assert_eq!(config.jira.token_env.as_deref(), Some("MY_TOKEN"));
        assert_eq!(config.jira.max_results, 50);
        assert_eq!(config.jira.timeout_secs, 5);
        assert_eq!(config.jira.fields, DEFAULT_FIELDS);

        let catalog = config.catalog();
        assert_eq!(catalog.count(), 2);
        assert_eq!(catalog.at(1).unwrap().name, "Everything");
        assert_eq!(catalog.at(0).unwrap().expression, "assignee = currentUser()");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.jira.sort, DEFAULT_SORT);
        assert_eq!(config.jira.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.jira.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.jira.token_env.as_deref(), Some("JIRA_API_TOKEN"));
        assert_eq!(config.catalog().count(), 4);
    }

    #[test]
    fn project_scopes_default_queries() {
        let config: Config = toml::from_str("[jira]\nproject = \"OPS\"\n").unwrap();
        let catalog = config.catalog();
        assert!(catalog.at(0).unwrap().expression.starts_with("project = OPS AND "));
    }

    #[test]
    fn endpoint_precedence() {
        assert_eq!(
            pick_endpoint(Some("https://cli"), Some("https://env"), Some("https://file")).unwrap(),
            "https://cli"
        );
        assert_eq!(
            pick_endpoint(None, Some("https://env"), Some("https://file")).unwrap(),
            "https://env"
        );
        assert_eq!(
            pick_endpoint(None, None, Some("https://file/")).unwrap(),
            "https://file"
        );
    }

    #[test]
    fn missing_endpoint_is_config_error() {
        assert!(matches!(pick_endpoint(None, None, None), Err(TixError::Config(_))));
    }

    #[test]
    fn load_from_missing_file_errors() {
        let err = Config::load_from(Path::new("/nonexistent/tix/config.toml")).unwrap_err();
        assert!(matches!(err, TixError::Config(_)));
    }
}
