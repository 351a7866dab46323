//! Read-only access to the hosted guide repository and the package registry.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base64 content in {path}: {source}")]
    Decode {
        path: String,
        source: base64::DecodeError,
    },

    #[error("{0} is not valid UTF-8")]
    Utf8(String),

    #[error("{0} is not a directory listing")]
    NotADirectory(String),

    #[error("Unexpected response for {0}")]
    UnexpectedResponse(String),

    #[error("Package {0} has no README")]
    MissingReadme(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// One item of a repository directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    path: String,
    content: String,
}

/// The parts of a registry package document we use
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryPackage {
    pub name: String,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
}

impl RegistryPackage {
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }
}

/// Location of a directory in a hosted repository
#[derive(Debug, Clone)]
pub struct RepoLocation {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
}

impl RepoLocation {
    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    basic_auth: Option<(String, String)>,
}

impl RemoteClient {
    pub fn new(user_agent: &str) -> Result<Self, CollectError> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            basic_auth: None,
        })
    }

    /// Authenticate hosted-repository requests when `GITHUB_USER` and
    /// `GITHUB_PASS` are both set
    pub fn from_env(user_agent: &str) -> Result<Self, CollectError> {
        let client = Self::new(user_agent)?;
        match (std::env::var("GITHUB_USER"), std::env::var("GITHUB_PASS")) {
            (Ok(user), Ok(pass)) => Ok(client.with_basic_auth(user, pass)),
            _ => Ok(client),
        }
    }

    pub fn with_basic_auth(mut self, user: String, pass: String) -> Self {
        self.basic_auth = Some((user, pass));
        self
    }

    async fn get_repo_json(&self, url: &str) -> Result<serde_json::Value, CollectError> {
        debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some((user, pass)) = &self.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }
        Ok(request.send().await?.error_for_status()?.json().await?)
    }

    pub async fn list_directory(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<Vec<ContentEntry>, CollectError> {
        let url = location.contents_url(path);
        let value = self.get_repo_json(&url).await?;
        if !value.is_array() {
            return Err(CollectError::NotADirectory(path.to_string()));
        }
        serde_json::from_value(value).map_err(|_| CollectError::NotADirectory(path.to_string()))
    }

    /// Decoded text of one file
    pub async fn file_contents(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<String, CollectError> {
        let url = location.contents_url(path);
        let value = self.get_repo_json(&url).await?;
        let file: ContentFile = serde_json::from_value(value)
            .map_err(|_| CollectError::UnexpectedResponse(path.to_string()))?;
        decode_content(&file.path, &file.content)
    }

    pub async fn package(
        &self,
        registry_url: &str,
        name: &str,
    ) -> Result<RegistryPackage, CollectError> {
        let url = format!(
            "{}/{}",
            registry_url.trim_end_matches('/'),
            name.replace('/', "%2F")
        );
        debug!("GET {}", url);
        Ok(self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

/// Base64 file content as served by the contents API, which wraps lines
pub fn decode_content(path: &str, content: &str) -> Result<String, CollectError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|source| CollectError::Decode {
            path: path.to_string(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|_| CollectError::Utf8(path.to_string()))
}
