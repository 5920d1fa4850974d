//! In-process stand-in for the Azure DevOps REST API.

use atas_config::{BoardsSettings, PipelineSettings};
use axum::http::HeaderMap;
use axum::Router;

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// True when the request carries Basic auth for the token `pat`.
pub fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Basic OnBhdA==")
}

pub fn pipeline_settings(base_url: &str) -> PipelineSettings {
    PipelineSettings {
        base_url: base_url.to_string(),
        token: Some("pat".into()),
        organization: "org".into(),
        project: "proj".into(),
        repository: "repo".into(),
        pipeline_id: 556,
        branch: "main".into(),
        file_path: "/cards.txt".into(),
    }
}

pub fn boards_settings(base_url: &str, user_name: Option<&str>) -> BoardsSettings {
    BoardsSettings {
        base_url: base_url.to_string(),
        token: Some("pat".into()),
        organization: "org".into(),
        project: "proj".into(),
        team: "team".into(),
        user_name: user_name.map(String::from),
    }
}
