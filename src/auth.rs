use std::path::PathBuf;

use tracing::debug;

use crate::config::{self, JiraConfig};

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

/// Stored token path: ~/.config/tix/token
fn token_path() -> Option<PathBuf> {
    Some(config::config_dir()?.join("token"))
}

fn load_stored_token() -> Option<String> {
    let path = token_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Find an API token, trying in order:
/// 1. The env var named by `token_env`
/// 2. A stored token in ~/.config/tix/token
/// 3. `token_command`
///
/// Returns `None` when nothing yields a token; requests are then anonymous.
pub fn load_token(jira: &JiraConfig) -> Option<String> {
    if let Some(env_var) = &jira.token_env {
        if let Ok(token) = std::env::var(env_var) {
            if !token.is_empty() {
                debug!(env_var = %env_var, "using token from environment");
                return Some(token);
            }
        }
    }

    if let Some(token) = load_stored_token() {
        debug!("using stored token");
        return Some(token);
    }

    if let Some(cmd) = &jira.token_command {
        if let Some(token) = try_cli_token(cmd) {
            debug!("using token from token_command");
            return Some(token);
        }
    }

    None
}
