//! Task-list file kept in a Git repository.

use atas_config::PipelineSettings;
use atas_core::text::repair_mojibake;
use atas_core::AtaError;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{check_status, DevOpsClient};

#[derive(Debug, Deserialize)]
struct RefList {
    #[serde(default)]
    value: Vec<GitRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitRef {
    name: String,
    object_id: String,
}

/// One file on one branch of a repository.
#[derive(Clone)]
pub struct GitRepo {
    client: DevOpsClient,
    repository: String,
    branch: String,
    file_path: String,
}

impl GitRepo {
    pub fn new(client: DevOpsClient, settings: &PipelineSettings) -> Self {
        Self {
            client,
            repository: settings.repository.clone(),
            branch: settings.branch.clone(),
            file_path: settings.file_path.clone(),
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Result<Self, AtaError> {
        Ok(Self::new(DevOpsClient::for_pipeline(settings)?, settings))
    }

    fn repo_url(&self, path: &str) -> String {
        self.client.project_url(&format!(
            "git/repositories/{}/{}",
            urlencoding::encode(&self.repository),
            path
        ))
    }

    /// Reads the file at the branch tip. A file that does not exist yet reads
    /// as empty.
    pub async fn get_file(&self) -> Result<String, AtaError> {
        let request = self.client.get(&self.repo_url("items")).query(&[
            ("path", self.file_path.as_str()),
            ("version", self.branch.as_str()),
            ("versionType", "branch"),
            ("$format", "text"),
        ]);

        let response = self.client.execute(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!("{} not found on {}, returning empty content", self.file_path, self.branch);
            return Ok(String::new());
        }

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| AtaError::Http(e.to_string()))?;

        Ok(repair_mojibake(&String::from_utf8_lossy(&bytes)))
    }

    /// Replaces the file with `content` in a single-commit push on top of the
    /// current branch tip.
    pub async fn save_file(&self, content: &str) -> Result<(), AtaError> {
        if content.trim().is_empty() {
            return Err(AtaError::InvalidInput("content must not be empty".into()));
        }

        let ref_name = format!("refs/heads/{}", self.branch);
        let filter = format!("heads/{}", self.branch);
        let refs: RefList = self
            .client
            .send_json(self.client.get(&self.repo_url("refs")).query(&[("filter", filter.as_str())]))
            .await?;

        // The filter is a prefix match, so prefer the exact branch.
        let mut refs = refs.value;
        let position = refs.iter().position(|r| r.name == ref_name).unwrap_or(0);
        if refs.is_empty() {
            return Err(AtaError::NotFound(format!("branch '{}'", self.branch)));
        }
        let tip = refs.swap_remove(position);

        let payload = push_payload(&ref_name, &tip.object_id, &self.file_path, content);
        self.client
            .send(self.client.post(&self.repo_url("pushes")).json(&payload))
            .await?;

        info!("Pushed {} to {} (parent {})", self.file_path, ref_name, tip.object_id);
        Ok(())
    }
}

fn push_payload(ref_name: &str, old_object_id: &str, file_path: &str, content: &str) -> Value {
    let file_name = file_path.rsplit('/').next().unwrap_or(file_path);
    json!({
        "refUpdates": [{ "name": ref_name, "oldObjectId": old_object_id }],
        "commits": [{
            "comment": format!("Atualizar {file_name} via painel web"),
            "changes": [{
                "changeType": "edit",
                "item": { "path": file_path },
                "newContent": {
                    "content": base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
                    "contentType": "base64encoded"
                }
            }]
        }]
    })
}
