//! Team sprints and the work items assigned to the user.

use atas_config::BoardsSettings;
use atas_core::company::{extract_company_from_title, filter_by_company};
use atas_core::{AtaError, PatchOperation, SprintSummary, WorkItem};
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{check_status, DevOpsClient};

/// Maximum ids per work-item batch request.
pub const WORK_ITEMS_CHUNK: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationAttributes {
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub time_frame: Option<String>,
}

/// A team iteration as returned by the team settings API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub attributes: IterationAttributes,
}

impl Iteration {
    pub fn summary(&self) -> SprintSummary {
        SprintSummary {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            path: self.path.clone(),
            start_date: self.attributes.start_date.clone(),
            end_date: self.attributes.finish_date.clone(),
        }
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        parse_instant(self.attributes.start_date.as_deref()?)
    }

    fn finish(&self) -> Option<DateTime<Utc>> {
        parse_instant(self.attributes.finish_date.as_deref()?)
    }

    /// True when `now` falls inside the iteration's dates (inclusive).
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        match (self.start(), self.finish()) {
            (Some(start), Some(finish)) => start <= now && now <= finish,
            _ => false,
        }
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The iteration running at `now`, else the first one listed.
pub fn pick_current(iterations: Vec<Iteration>, now: DateTime<Utc>) -> Option<Iteration> {
    let position = iterations.iter().position(|i| i.contains(now)).unwrap_or(0);
    iterations.into_iter().nth(position)
}

/// The iteration running at `now` and up to two before it, most recent first.
/// When no iteration is running, the latest started one stands in for it.
pub fn recent_sprints(mut iterations: Vec<Iteration>, now: DateTime<Utc>) -> Vec<SprintSummary> {
    iterations.sort_by_key(|i| i.start());

    let current = iterations
        .iter()
        .position(|i| i.contains(now))
        .or_else(|| {
            iterations
                .iter()
                .position(|i| i.attributes.time_frame.as_deref() == Some("current"))
        })
        .or_else(|| iterations.iter().rposition(|i| i.start().is_some_and(|s| s <= now)));

    let Some(current) = current else {
        return Vec::new();
    };

    iterations[current.saturating_sub(2)..=current]
        .iter()
        .rev()
        .map(Iteration::summary)
        .collect()
}

/// Single-quoted WIQL string literal.
fn wiql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResponse {
    #[serde(default)]
    work_items: Vec<WorkItemRef>,
}

#[derive(Debug, Deserialize)]
struct WorkItemRef {
    id: u64,
}

/// A team's boards within one project.
#[derive(Clone)]
pub struct Boards {
    client: DevOpsClient,
    team: String,
    user_name: Option<String>,
}

impl Boards {
    pub fn from_settings(settings: &BoardsSettings) -> Result<Self, AtaError> {
        let client = DevOpsClient::new(
            &settings.base_url,
            &settings.organization,
            &settings.project,
            settings.token.as_deref(),
            "AZURE_BOARDS_TOKEN",
        )?;

        Ok(Self {
            client,
            team: settings.team.clone(),
            user_name: settings.user_name.clone(),
        })
    }

    fn iterations_url(&self, suffix: &str) -> String {
        self.client
            .team_url(&self.team, &format!("work/teamsettings/iterations{suffix}"))
    }

    async fn iterations(&self, timeframe: Option<&str>) -> Result<Vec<Iteration>, AtaError> {
        let mut request = self.client.get(&self.iterations_url(""));
        if let Some(timeframe) = timeframe {
            request = request.query(&[("$timeframe", timeframe)]);
        }
        let list: ListResponse<Iteration> = self.client.send_json(request).await?;
        Ok(list.value)
    }

    /// The team's active sprint, if any.
    pub async fn current_sprint(&self) -> Result<Option<Iteration>, AtaError> {
        let iterations = self.iterations(Some("current")).await?;
        Ok(pick_current(iterations, Utc::now()))
    }

    /// Every iteration configured for the team.
    pub async fn all_sprints(&self) -> Result<Vec<Iteration>, AtaError> {
        self.iterations(None).await
    }

    /// Iteration path of a sprint id, `None` when the team has no such sprint.
    pub async fn sprint_path(&self, sprint_id: &str) -> Result<Option<String>, AtaError> {
        let url = self.iterations_url(&format!("/{}", urlencoding::encode(sprint_id)));
        let response = self.client.execute(self.client.get(&url)).await?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Ok(None);
        }
        let iteration: Iteration = parse(check_status(response).await?).await?;
        Ok(Some(iteration.path).filter(|p| !p.is_empty()))
    }

    /// Current sprint plus up to two previous ones, most recent first.
    pub async fn last_three_sprints(&self) -> Result<Vec<SprintSummary>, AtaError> {
        let iterations = self.all_sprints().await?;
        Ok(recent_sprints(iterations, Utc::now()))
    }

    /// Summary of `sprint_id` among the team's iterations, or a placeholder.
    pub async fn sprint_summary(&self, sprint_id: &str) -> Result<SprintSummary, AtaError> {
        let iterations = self.all_sprints().await?;
        Ok(iterations
            .iter()
            .find(|i| i.id == sprint_id)
            .map(Iteration::summary)
            .unwrap_or_else(|| SprintSummary::unknown(sprint_id)))
    }

    /// Work items assigned to the user in `sprint_id` (the current sprint
    /// when absent), optionally narrowed to one company.
    pub async fn my_work_items(
        &self,
        sprint_id: Option<&str>,
        company: Option<&str>,
    ) -> Result<Vec<WorkItem>, AtaError> {
        let path = match sprint_id {
            Some(id) => self.sprint_path(id).await?,
            None => self.current_sprint().await?.map(|s| s.path),
        };

        match path {
            Some(path) => self.work_items_in_path(&path, company).await,
            None => Ok(Vec::new()),
        }
    }

    /// Work items assigned to the user under an iteration path.
    pub async fn work_items_in_path(&self, path: &str, company: Option<&str>) -> Result<Vec<WorkItem>, AtaError> {
        let url = self.client.project_url("wit/wiql");
        let wiql: WiqlResponse = self
            .client
            .send_json(self.client.post(&url).json(&json!({ "query": self.wiql(path) })))
            .await?;

        let ids: Vec<u64> = wiql.work_items.iter().map(|w| w.id).collect();
        debug!("WIQL matched {} work items in {}", ids.len(), path);

        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(WORK_ITEMS_CHUNK) {
            items.extend(self.work_items_batch(chunk).await?);
        }

        for item in &mut items {
            item.company = extract_company_from_title(item.title());
        }

        let items = filter_by_company(items, company);
        info!("Found {} work items in {}", items.len(), path);
        Ok(items)
    }

    fn wiql(&self, path: &str) -> String {
        let assignee = self
            .user_name
            .as_deref()
            .map(wiql_literal)
            .unwrap_or_else(|| "@Me".to_string());

        format!(
            "SELECT [System.Id], [System.Title], [System.State], [System.WorkItemType], \
             [System.AssignedTo], [System.CreatedDate], [System.ChangedDate], \
             [Microsoft.VSTS.Common.Priority], [Microsoft.VSTS.Scheduling.Effort] \
             FROM WorkItems \
             WHERE [System.TeamProject] = {} \
             AND [System.IterationPath] = {} \
             AND [System.AssignedTo] = {} \
             ORDER BY [System.ChangedDate] DESC",
            wiql_literal(self.client.project()),
            wiql_literal(path),
            assignee
        )
    }

    async fn work_items_batch(&self, ids: &[u64]) -> Result<Vec<WorkItem>, AtaError> {
        let ids = ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
        let request = self
            .client
            .get(&self.client.project_url("wit/workitems"))
            .query(&[("ids", ids.as_str()), ("$expand", "fields")]);
        let list: ListResponse<WorkItem> = self.client.send_json(request).await?;
        Ok(list.value)
    }

    /// A single work item with all of its fields.
    pub async fn work_item(&self, id: u64) -> Result<WorkItem, AtaError> {
        let url = self.client.project_url(&format!("wit/workitems/{id}"));
        let response = self.client.execute(self.client.get(&url)).await?;
        parse(found(response, id).await?).await
    }

    /// Applies JSON Patch operations to a work item and returns the result.
    pub async fn update_fields(&self, id: u64, operations: &[PatchOperation]) -> Result<WorkItem, AtaError> {
        let url = self.client.project_url(&format!("wit/workitems/{id}"));
        let body = serde_json::to_vec(operations)?;
        let request = self
            .client
            .patch(&url)
            .header("Content-Type", "application/json-patch+json")
            .body(body);

        let response = self.client.execute(request).await?;
        let item = parse(found(response, id).await?).await?;
        info!("Updated {} fields on work item {}", operations.len(), id);
        Ok(item)
    }
}

async fn found(response: Response, id: u64) -> Result<Response, AtaError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(AtaError::NotFound(format!("work item {id}")));
    }
    check_status(response).await
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AtaError> {
    response.json().await.map_err(|e| AtaError::Parse(e.to_string()))
}
