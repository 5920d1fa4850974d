//! Azure DevOps REST client.
//!
//! [`GitRepo`] and [`Pipelines`] cover the task file a pipeline consumes and
//! the pipeline itself. [`Boards`] covers team sprints and the work items that
//! carry meeting minutes. All of them share [`DevOpsClient`] for auth and
//! error mapping.

mod boards;
mod git;
mod pipelines;

#[cfg(test)]
mod testing;

pub use boards::{Boards, Iteration, IterationAttributes, WORK_ITEMS_CHUNK};
pub use git::GitRepo;
pub use pipelines::Pipelines;

use atas_config::PipelineSettings;
use atas_core::AtaError;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::error;

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.0";

/// Authenticated access to one organization/project.
#[derive(Clone)]
pub struct DevOpsClient {
    http: Client,
    base_url: String,
    organization: String,
    project: String,
    auth_header: String,
}

impl DevOpsClient {
    /// Creates a client using a personal access token. A missing token is a
    /// configuration error reported to the caller.
    pub fn new(
        base_url: &str,
        organization: &str,
        project: &str,
        token: Option<&str>,
        token_var: &str,
    ) -> Result<Self, AtaError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AtaError::MissingConfig(format!("{token_var} is not set")))?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));

        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            organization: organization.to_string(),
            project: project.to_string(),
            auth_header: format!("Basic {encoded}"),
        })
    }

    /// Client for the pipeline profile. Clones share one connection pool, so
    /// [`GitRepo`] and [`Pipelines`] are built from the same instance.
    pub fn for_pipeline(settings: &PipelineSettings) -> Result<Self, AtaError> {
        Self::new(
            &settings.base_url,
            &settings.organization,
            &settings.project,
            settings.token.as_deref(),
            "AZURE_DEVOPS_TOKEN",
        )
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `{base}/{org}/{project}/_apis/{path}`
    pub fn project_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/_apis/{}",
            self.base_url,
            urlencoding::encode(&self.organization),
            urlencoding::encode(&self.project),
            path
        )
    }

    /// `{base}/{org}/{project}/{team}/_apis/{path}`
    pub fn team_url(&self, team: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/_apis/{}",
            self.base_url,
            urlencoding::encode(&self.organization),
            urlencoding::encode(&self.project),
            urlencoding::encode(team),
            path
        )
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    pub(crate) fn patch(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.patch(url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", &self.auth_header)
            .query(&[("api-version", API_VERSION)])
    }

    /// Sends a request without inspecting the status code.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Response, AtaError> {
        builder.send().await.map_err(|e| {
            error!("Azure DevOps request failed: {}", e);
            AtaError::Http(e.to_string())
        })
    }

    /// Sends a request, turning transport failures and non-2xx statuses into
    /// [`AtaError`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, AtaError> {
        let response = self.execute(builder).await?;
        check_status(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AtaError> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| AtaError::Parse(e.to_string()))
    }
}

pub(crate) async fn check_status(response: Response) -> Result<Response, AtaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Azure DevOps API error {}: {}", status, body);
    Err(AtaError::ExternalApi {
        status: status.as_u16(),
        body,
    })
}
