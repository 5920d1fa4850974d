//! Pipeline runs and build polling.

use atas_config::PipelineSettings;
use atas_core::pipeline::{result_label, status_label};
use atas_core::{AtaError, BuildStatus, PipelineRun};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::DevOpsClient;

#[derive(Debug, Default, Deserialize)]
struct Links {
    web: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

impl Links {
    fn web_href(self) -> Option<String> {
        self.web.map(|l| l.href)
    }
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    id: Option<u64>,
    url: Option<String>,
    state: Option<String>,
    #[serde(rename = "_links", default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildResponse {
    status: Option<String>,
    result: Option<String>,
    #[serde(rename = "_links", default)]
    links: Links,
    start_time: Option<String>,
    finish_time: Option<String>,
    queue_time: Option<String>,
    build_number: Option<String>,
}

/// A pipeline that runs against one branch.
#[derive(Clone)]
pub struct Pipelines {
    client: DevOpsClient,
    pipeline_id: u64,
    branch: String,
}

impl Pipelines {
    pub fn new(client: DevOpsClient, settings: &PipelineSettings) -> Self {
        Self {
            client,
            pipeline_id: settings.pipeline_id,
            branch: settings.branch.clone(),
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Result<Self, AtaError> {
        Ok(Self::new(DevOpsClient::for_pipeline(settings)?, settings))
    }

    /// Queues a run of the pipeline on the configured branch.
    pub async fn run(&self) -> Result<PipelineRun, AtaError> {
        let url = self.client.project_url(&format!("pipelines/{}/runs", self.pipeline_id));
        let body = json!({
            "resources": {
                "repositories": {
                    "self": { "refName": format!("refs/heads/{}", self.branch) }
                }
            }
        });

        let run: RunResponse = self.client.send_json(self.client.post(&url).json(&body)).await?;
        info!("Queued pipeline {} on {}: run {:?}", self.pipeline_id, self.branch, run.id);

        Ok(PipelineRun {
            success: true,
            build_id: run.id,
            build_url: run.links.web_href().or(run.url),
            status: run.state.unwrap_or_else(|| "queued".to_string()),
        })
    }

    /// Current status of a build, with display labels.
    pub async fn status(&self, build_id: u64) -> Result<BuildStatus, AtaError> {
        let url = self.client.project_url(&format!("build/builds/{build_id}"));
        let build: BuildResponse = self.client.send_json(self.client.get(&url)).await?;

        let raw_status = build.status.unwrap_or_else(|| "unknown".to_string());

        Ok(BuildStatus {
            success: true,
            build_id: Some(build_id),
            status: status_label(&raw_status),
            result: build.result.as_deref().map(result_label),
            build_url: build.links.web_href().unwrap_or_default(),
            start_time: build.start_time,
            finish_time: build.finish_time,
            queue_time: build.queue_time,
            build_number: build.build_number,
            is_completed: raw_status == "completed",
        })
    }
}
