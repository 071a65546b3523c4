use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::JiraConfig;
use crate::error::{Result, TixError};
use crate::source::TicketSource;

pub struct Jira {
    client: Client,
    endpoint: String,
    user: Option<String>,
    token: Option<String>,
    fields: String,
    sort: String,
    max_results: u32,
    timeout: Duration,
}

impl std::fmt::Debug for Jira {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jira")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for TixError {
    fn from(err: reqwest::Error) -> Self {
        TixError::Api(err.to_string())
    }
}

impl Jira {
    pub fn new(endpoint: String, config: &JiraConfig, token: Option<String>) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .user_agent(concat!("tix/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user: config.resolve_user(),
            token,
            fields: config.fields.clone(),
            sort: config.sort.clone(),
            max_results: config.max_results,
            timeout,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.endpoint, path)
    }

    fn search_url(&self, jql: &str) -> String {
        format!(
            "{}?jql={}&fields={}&maxResults={}",
            self.api_url("/search"),
            urlencoding::encode(&ordered_jql(jql, &self.sort)),
            urlencoding::encode(&self.fields),
            self.max_results
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = match &self.user {
                Some(user) => request.basic_auth(user, Some(token)),
                None => request.bearer_auth(token),
            };
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => TixError::Auth(format!("Jira API {}", status)),
                _ => TixError::Api(format!("Jira API {}: {}", status, error_detail(&text))),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TixError::Api(e.to_string()))
    }

    /// Name of the account the client is authenticated as.
    pub async fn current_user(&self) -> Result<String> {
        let me: JrUser = self.get_json(&self.api_url("/myself")).await?;
        me.name
            .or(me.display_name)
            .ok_or_else(|| TixError::Api("no user name in /myself response".to_string()))
    }
}

// Jira API response types

#[derive(Deserialize)]
struct JrSearch {
    #[serde(default)]
    issues: Vec<JrIssue>,
}

#[derive(Deserialize)]
struct JrIssue {
    key: String,
    #[serde(default)]
    fields: JrFields,
}

#[derive(Deserialize, Default)]
struct JrFields {
    summary: Option<String>,
}

#[derive(Deserialize)]
struct JrUser {
    name: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct JrErrorBody {
    #[serde(rename = "errorMessages", default)]
    error_messages: Vec<String>,
}

/// Append the configured ordering unless the query already has one.
fn ordered_jql(jql: &str, sort: &str) -> String {
    if sort.is_empty() || jql.to_ascii_lowercase().contains("order by") {
        jql.to_string()
    } else {
        format!("{} ORDER BY {}", jql, sort)
    }
}

fn format_row(issue: &JrIssue) -> String {
    format!(
        "{:<12} {}",
        format!("{}:", issue.key),
        issue.fields.summary.as_deref().unwrap_or("")
    )
}

/// Prefer Jira's `errorMessages` over the raw body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<JrErrorBody>(body) {
        Ok(parsed) if !parsed.error_messages.is_empty() => parsed.error_messages.join("; "),
        _ => body.trim().to_string(),
    }
}

fn rows_from_search(search: JrSearch) -> Vec<String> {
    search.issues.iter().map(format_row).collect()
}

#[async_trait]
impl TicketSource for Jira {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let search: JrSearch = self.get_json(&self.search_url(query)).await?;
        Ok(rows_from_search(search))
    }
}
