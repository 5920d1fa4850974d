//! Router tests against a stub model and an in-process Azure DevOps fake.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atas_config::Settings;
use atas_core::AtaError;
use atas_llm::ChatModel;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{app, ServerState};

const REPLY: &str = "Título: Kickoff TOTVS\n\nObjetivo: Alinhar o escopo.\n\nPróximos passos:\n- Enviar proposta\n\nFim.";

struct StubModel;

#[async_trait]
impl ChatModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String, AtaError> {
        assert!(prompt.contains("Template: # ATA"));
        Ok(REPLY.to_string())
    }
}

// ── Fake Azure DevOps ───────────────────────────────────────────────────

#[derive(Default)]
struct FakeDevOps {
    active_sprint: bool,
    pushes: Mutex<Vec<Value>>,
    patches: Mutex<Vec<Value>>,
}

fn iterations_for(active: bool) -> (Vec<Value>, Vec<Value>) {
    if !active {
        return (Vec::new(), Vec::new());
    }
    let now = Utc::now();
    let sprint = |id: &str, start: chrono::DateTime<Utc>, finish: chrono::DateTime<Utc>| {
        json!({
            "id": id,
            "name": format!("Sprint {id}"),
            "path": format!("Consultoria\\Sprint {id}"),
            "attributes": { "startDate": start.to_rfc3339(), "finishDate": finish.to_rfc3339() }
        })
    };
    let previous = sprint("s1", now - Duration::days(17), now - Duration::days(4));
    let current = sprint("s2", now - Duration::days(3), now + Duration::days(3));
    (vec![current.clone()], vec![previous, current])
}

fn remote_item(id: u64) -> Value {
    let fields = match id {
        1 => json!({
            "System.Title": "[ATA][TOTVS] Kickoff",
            "System.State": "Active",
            "Custom.Local": "Sala 3",
            "Custom.DataHoraInicio": "2025-10-06T13:00:00Z",
            "Custom.DataHoraFim": "2025-10-06T14:30:00Z",
            "Custom.Assunto": "Escopo",
            "Custom.ProximoPasso1": "Enviar proposta",
            "Custom.Responsavel1": "Ana",
            "Custom.DataPrazo1": "2025-10-10T03:00:00Z"
        }),
        2 => json!({ "System.Title": "[ACME] Ajuste de layout", "System.State": "New" }),
        _ => json!({ "System.Title": format!("[Task] Revisar pipeline {id}"), "System.State": "New" }),
    };
    json!({ "id": id, "url": format!("https://dev.azure.com/_apis/wit/workItems/{id}"), "fields": fields })
}

async fn iterations(
    State(fake): State<Arc<FakeDevOps>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let (current, all) = iterations_for(fake.active_sprint);
    let value = if query.contains_key("$timeframe") { current } else { all };
    Json(json!({ "value": value }))
}

async fn iteration(State(fake): State<Arc<FakeDevOps>>, Path(id): Path<String>) -> axum::response::Response {
    let (_, all) = iterations_for(fake.active_sprint);
    match all.into_iter().find(|i| i["id"] == id.as_str()) {
        Some(found) => Json(found).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn wiql() -> Json<Value> {
    Json(json!({ "workItems": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] }))
}

async fn batch(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let value: Vec<Value> = query["ids"]
        .split(',')
        .filter_map(|id| id.parse().ok())
        .map(remote_item)
        .collect();
    Json(json!({ "value": value }))
}

async fn work_item(Path(id): Path<u64>) -> axum::response::Response {
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(remote_item(id)).into_response()
}

async fn patch_work_item(
    State(fake): State<Arc<FakeDevOps>>,
    Path(id): Path<u64>,
    body: String,
) -> axum::response::Response {
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    let ops: Value = serde_json::from_str(&body).unwrap();
    let mut item = remote_item(id);
    for op in ops.as_array().unwrap() {
        let field = op["path"].as_str().unwrap().trim_start_matches("/fields/");
        item["fields"][field] = op["value"].clone();
    }
    fake.patches.lock().unwrap().push(ops);
    Json(item).into_response()
}

async fn file() -> &'static str {
    "87724\nAtualizaÃ§Ã£o"
}

async fn refs() -> Json<Value> {
    Json(json!({ "value": [{ "name": "refs/heads/main", "objectId": "abc" }] }))
}

async fn pushes(State(fake): State<Arc<FakeDevOps>>, Json(body): Json<Value>) -> StatusCode {
    fake.pushes.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn runs() -> Json<Value> {
    Json(json!({ "id": 77, "url": "https://dev.azure.com/runs/77", "state": "inProgress" }))
}

async fn build(Path(id): Path<u64>) -> Json<Value> {
    Json(json!({ "id": id, "status": "completed", "result": "failed", "buildNumber": "20251006.2" }))
}

async fn serve_fake(fake: Arc<FakeDevOps>) -> String {
    let router = Router::new()
        .route("/org/proj/_apis/git/repositories/repo/items", get(file))
        .route("/org/proj/_apis/git/repositories/repo/refs", get(refs))
        .route("/org/proj/_apis/git/repositories/repo/pushes", post(pushes))
        .route("/org/proj/_apis/pipelines/{id}/runs", post(runs))
        .route("/org/proj/_apis/build/builds/{id}", get(build))
        .route("/borg/bproj/team/_apis/work/teamsettings/iterations", get(iterations))
        .route("/borg/bproj/team/_apis/work/teamsettings/iterations/{id}", get(iteration))
        .route("/borg/bproj/_apis/wit/wiql", post(wiql))
        .route("/borg/bproj/_apis/wit/workitems", get(batch))
        .route("/borg/bproj/_apis/wit/workitems/{id}", get(work_item).patch(patch_work_item))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ── Fixture ─────────────────────────────────────────────────────────────

struct Options {
    model: bool,
    tokens: bool,
    template: bool,
    active_sprint: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { model: true, tokens: true, template: true, active_sprint: true }
    }
}

struct Fixture {
    app: Router,
    fake: Arc<FakeDevOps>,
    _dir: TempDir,
}

async fn fixture(options: Options) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.md");
    if options.template {
        std::fs::write(&template_path, "# ATA\nTítulo:\nObjetivo:\nPróximos passos:\n").unwrap();
    }

    let fake = Arc::new(FakeDevOps { active_sprint: options.active_sprint, ..Default::default() });
    let base = serve_fake(fake.clone()).await;

    let mut env: HashMap<&str, String> = HashMap::from([
        ("TEMPLATE_PATH", template_path.display().to_string()),
        ("AZURE_DEVOPS_BASE_URL", base),
        ("AZURE_DEVOPS_ORG", "org".into()),
        ("AZURE_DEVOPS_PROJECT", "proj".into()),
        ("AZURE_DEVOPS_REPO", "repo".into()),
        ("AZURE_BOARDS_ORG", "borg".into()),
        ("AZURE_BOARDS_PROJECT", "bproj".into()),
        ("AZURE_BOARDS_TEAM", "team".into()),
    ]);
    if options.tokens {
        env.insert("AZURE_DEVOPS_TOKEN", "pat".into());
        env.insert("AZURE_BOARDS_TOKEN", "pat".into());
    }
    let settings = Settings::from_lookup(|name| env.get(name).cloned()).unwrap();

    let model: Option<Arc<dyn ChatModel>> = options.model.then(|| Arc::new(StubModel) as Arc<dyn ChatModel>);
    let state = Arc::new(ServerState::new(&settings, model));

    Fixture { app: app(state), fake, _dir: dir }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_req(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let f = fixture(Options::default()).await;
    let response = f.app.clone().oneshot(get_req("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_generate_ata_from_form() {
    let f = fixture(Options::default()).await;

    for uri in ["/gerar_ata", "/api/atas/gerar"] {
        let (status, body) = send(
            &f.app,
            form_req(uri, "data=06-10-2025&requerimento=87724&resumo=Reuni%C3%A3o+de+kickoff"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ata"], REPLY);
        assert_eq!(body["titulo"], "Kickoff TOTVS");
        assert_eq!(body["proximos"], "- Enviar proposta");
        assert_eq!(body["nome_arquivo"], "87724 - [ATA] Kickoff TOTVS - Atividade do dia 06-10-2025.md");
    }
}

#[tokio::test]
async fn test_generate_ata_rejects_blank_summary() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, form_req("/gerar_ata", "data=&requerimento=1&resumo=")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("resumo"));
}

#[tokio::test]
async fn test_generate_ata_missing_template_or_model() {
    let f = fixture(Options { template: false, ..Default::default() }).await;
    let (status, body) = send(&f.app, form_req("/gerar_ata", "resumo=texto")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("template.md"));

    let f = fixture(Options { model: false, ..Default::default() }).await;
    let (status, body) = send(&f.app, form_req("/gerar_ata", "resumo=texto")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("HF_TOKEN"));
}

#[tokio::test]
async fn test_pipeline_file_round() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, get_req("/get_pipeline_file")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "87724\nAtualização");

    let (status, body) = send(&f.app, json_req("POST", "/save_pipeline_file", json!({ "content": "87725" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Arquivo salvo com sucesso" }));
    assert_eq!(f.fake.pushes.lock().unwrap()[0]["refUpdates"][0]["oldObjectId"], "abc");

    let (status, _) = send(&f.app, json_req("POST", "/save_pipeline_file", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_run_pipeline_and_poll() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, Request::post("/run_pipeline").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["buildId"], 77);
    assert_eq!(body["buildUrl"], "https://dev.azure.com/runs/77");
    assert_eq!(body["status"], "inProgress");

    let (status, body) = send(&f.app, get_req("/pipeline_status/77")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "concluída");
    assert_eq!(body["result"], "falhou");
    assert_eq!(body["isCompleted"], true);
    assert_eq!(body["buildNumber"], "20251006.2");
}

#[tokio::test]
async fn test_missing_tokens_are_config_errors() {
    let f = fixture(Options { tokens: false, ..Default::default() }).await;

    let (status, body) = send(&f.app, get_req("/get_pipeline_file")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("AZURE_DEVOPS_TOKEN"));

    let (status, body) = send(&f.app, get_req("/api/my-cards")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("AZURE_BOARDS_TOKEN"));
}

#[tokio::test]
async fn test_my_cards_in_active_sprint() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, get_req("/api/my-cards")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sprint"]["id"], "s2");
    assert!(body["sprint"]["startDate"].is_string());
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["work_items"][0]["company"], "TOTVS");
    assert_eq!(body["work_items"][2]["company"], Value::Null);
    assert_eq!(body["message"], "Encontrados 3 work items na sprint ativa");
}

#[tokio::test]
async fn test_my_work_items_without_active_sprint() {
    let f = fixture(Options { active_sprint: false, ..Default::default() }).await;

    let (status, body) = send(&f.app, get_req("/api/boards/my-work-items")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sprint"], Value::Null);
    assert_eq!(body["work_items"], json!([]));
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["message"], "Nenhuma sprint ativa encontrada");
}

#[tokio::test]
async fn test_my_work_items_filters() {
    let f = fixture(Options::default()).await;

    let (_, body) = send(&f.app, get_req("/api/boards/my-work-items?company=acme")).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["work_items"][0]["id"], 2);
    assert_eq!(body["message"], "Encontrados 1 work items filtrados por empresa: acme");

    let (_, body) = send(&f.app, get_req("/api/boards/my-work-items?sprint_id=s1&company=")).await;
    assert_eq!(body["sprint"]["name"], "Sprint s1");
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["message"], "Encontrados 3 work items na sprint selecionada");

    let (_, body) = send(&f.app, get_req("/api/boards/my-work-items?sprint_id=zz")).await;
    assert_eq!(body["sprint"]["id"], "zz");
    assert_eq!(body["sprint"]["name"], "Sprint zz");
    assert_eq!(body["sprint"]["path"], "");
    assert_eq!(body["work_items"], json!([]));
}

#[tokio::test]
async fn test_sprints_and_sprint_info() {
    let f = fixture(Options::default()).await;

    let (_, body) = send(&f.app, get_req("/api/boards/sprints")).await;
    let ids: Vec<&str> = body["sprints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["s2", "s1"]);

    let (_, body) = send(&f.app, get_req("/api/sprint-info")).await;
    assert_eq!(body["sprint"]["name"], "Sprint s2");
    assert!(body.get("message").is_none());

    let f = fixture(Options { active_sprint: false, ..Default::default() }).await;
    let (_, body) = send(&f.app, get_req("/api/sprint-info")).await;
    assert_eq!(body, json!({ "sprint": null, "message": "Nenhuma sprint ativa encontrada" }));
}

#[tokio::test]
async fn test_companies() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, get_req("/api/companies")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "companies": ["ACME", "TOTVS"] }));
}

#[tokio::test]
async fn test_ata_details() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, get_req("/api/ata/1/details")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "[ATA][TOTVS] Kickoff");
    assert_eq!(body["start_datetime"], "2025-10-06T10:00");
    assert_eq!(body["finish_datetime"], "2025-10-06T11:30");
    assert_eq!(
        body["next_steps"],
        json!([{ "slot": 1, "action": "Enviar proposta", "responsible": "Ana", "date": "2025-10-10" }])
    );

    let (status, body) = send(&f.app, get_req("/api/ata/404/details")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_ata_status_update() {
    let f = fixture(Options::default()).await;

    let (status, body) = send(&f.app, json_req("PUT", "/api/ata/1/status", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "status is required");
    assert!(f.fake.patches.lock().unwrap().is_empty());

    let (status, body) = send(&f.app, json_req("PUT", "/api/ata/1/status", json!({ "status": "Closed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "id": 1, "state": "Closed" }));
}

#[tokio::test]
async fn test_ata_save() {
    let f = fixture(Options::default()).await;

    let update = json!({
        "location": "Remoto",
        "start_datetime": "2025-10-06T10:00",
        "next_steps": [
            { "action": "Revisar", "responsible": "Bia", "date": "2025-10-12" },
            { "slot": 3, "action": "Homologar", "responsible": "Caio", "date": "" }
        ]
    });
    let (status, body) = send(&f.app, json_req("POST", "/api/ata/1/save", update)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let fields = body["updated_fields"].as_array().unwrap();
    assert!(fields.contains(&json!("Custom.Local")));
    assert!(fields.contains(&json!("Custom.DataHoraInicio")));
    assert!(fields.contains(&json!("Custom.ProximoPasso10")));

    let patches = f.fake.patches.lock().unwrap();
    let ops = patches[0].as_array().unwrap();
    let start = ops.iter().find(|op| op["path"] == "/fields/Custom.DataHoraInicio").unwrap();
    assert_eq!(start["value"], "2025-10-06T13:00:00Z");
    let due = ops.iter().find(|op| op["path"] == "/fields/Custom.DataPrazo1").unwrap();
    assert_eq!(due["value"], "2025-10-12T03:00:00Z");
    let value = |field: &str| ops.iter().find(|op| op["path"] == format!("/fields/{field}")).unwrap()["value"].clone();
    assert_eq!(value("Custom.ProximoPasso2"), "");
    assert_eq!(value("Custom.ProximoPasso3"), "Homologar");
}

#[tokio::test]
async fn test_ata_save_rejects_bad_datetime() {
    let f = fixture(Options::default()).await;

    let (status, _) = send(
        &f.app,
        json_req("POST", "/api/ata/1/save", json!({ "start_datetime": "amanhã" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(f.fake.patches.lock().unwrap().is_empty());
}
