//! HTTP surface integration tests
//!
//! Exercise the axum router end to end with `tower::ServiceExt::oneshot`
//! over a bridge backed by the scripted runtime.

mod common;

use a3s_bridge::runtime::scripted::{Script, ScriptedRuntime};
use a3s_bridge::server::{router, state::AppState};
use a3s_bridge::{BridgeConfig, GateConfig, StartRequest, StreamEvent};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(runtime: Arc<ScriptedRuntime>, gate: GateConfig) -> (Router, AppState) {
    let state = AppState::new(
        Arc::new(bridge(runtime, gate)),
        Arc::new(BridgeConfig::default()),
    );
    (router::build(state.clone()), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_lines(response: axum::response::Response) -> Vec<Value> {
    let bytes = tokio::time::timeout(
        Duration::from_secs(10),
        to_bytes(response.into_body(), usize::MAX),
    )
    .await
    .expect("stream did not end")
    .unwrap();
    std::str::from_utf8(&bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn quick_resolve() -> GateConfig {
    GateConfig {
        resolve_wait: Duration::from_millis(50),
        resolve_poll: Duration::from_millis(10),
        ..Default::default()
    }
}

// ─── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (app, _) = app(Arc::new(ScriptedRuntime::new()), GateConfig::default());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["pendingApprovals"], 0);
}

// ─── Chat ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_streams_ndjson() {
    let runtime = Arc::new(ScriptedRuntime::new());
    runtime
        .push(
            Script::new()
                .line(init("s-http"))
                .line(assistant_text("hello"))
                .line(result_success())
                .exit(Some(0)),
        )
        .await;
    let (app, _) = app(runtime, GateConfig::default());

    let response = app
        .oneshot(post_json(
            "/api/agent/chat",
            json!({"projectId": PROJECT, "prompt": "hi", "mode": "plan", "effort": "high"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let lines = body_lines(response).await;
    let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["session", "init", "message_delta", "result", "done"]
    );
    assert_eq!(lines[0]["resumed"], false);
    assert_eq!(lines[2]["content"][0]["text"], "hello");
    assert_eq!(lines[3]["usage"]["outputTokens"], 40);
}

#[tokio::test]
async fn test_chat_rejects_missing_project() {
    let runtime = Arc::new(ScriptedRuntime::new());
    let (app, state) = app(runtime.clone(), GateConfig::default());

    let response = app
        .oneshot(post_json("/api/agent/chat", json!({"prompt": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("project"));

    assert!(state.registry.is_empty().await);
    assert!(runtime.launches().await.is_empty());
}

#[tokio::test]
async fn test_chat_rejects_unknown_project() {
    let (app, _) = app(Arc::new(ScriptedRuntime::new()), GateConfig::default());

    let response = app
        .oneshot(post_json(
            "/api/agent/chat",
            json!({"projectId": "missing", "prompt": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_chat_launch_failure_is_in_stream() {
    let (app, _) = app(Arc::new(ScriptedRuntime::new()), GateConfig::default());

    let response = app
        .oneshot(post_json(
            "/api/agent/chat",
            json!({"projectId": PROJECT, "prompt": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let lines = body_lines(response).await;
    assert_eq!(lines[1]["type"], "error");
    assert_eq!(lines[1]["kind"], "launch_failed");
    assert_eq!(lines[2]["type"], "done");
}

// ─── Approvals ───────────────────────────────────────────────────

#[tokio::test]
async fn test_resolve_unknown_approval() {
    let (app, _) = app(Arc::new(ScriptedRuntime::new()), quick_resolve());

    let response = app
        .oneshot(post_json(
            "/api/agent/approvals",
            json!({
                "sessionId": "nobody",
                "interactionId": "tu1",
                "decision": {"behavior": "allow"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"resolved": false}));
}

#[tokio::test]
async fn test_resolve_rejects_empty_ids() {
    let (app, _) = app(Arc::new(ScriptedRuntime::new()), quick_resolve());

    let response = app
        .oneshot(post_json(
            "/api/agent/approvals",
            json!({
                "sessionId": "",
                "interactionId": "tu1",
                "decision": {"behavior": "deny", "message": "no"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_and_resolve_pending_approval() {
    let input = json!({"questions": [{"question": "Proceed?"}]});
    let runtime = Arc::new(ScriptedRuntime::new());
    let probe = runtime
        .push(
            Script::new()
                .line(init("s-ask"))
                .line(can_use_tool("r1", "tu1", "AskUserQuestion", input.clone()))
                .await_response("r1")
                .line(result_success())
                .exit(Some(0)),
        )
        .await;
    let (app, state) = app(runtime, GateConfig::default());

    let events = state
        .bridge
        .start(StartRequest {
            project_id: Some(PROJECT.to_string()),
            prompt: "ask".to_string(),
            session_id: Some("s-ask".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    {
        let state = state.clone();
        eventually(move || {
            let state = state.clone();
            async move { state.gate.pending_count(None).await == 1 }
        })
        .await;
    }

    let response = app
        .clone()
        .oneshot(get("/api/agent/approvals?sessionId=s-ask"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let approvals = body["approvals"].as_array().unwrap();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0]["interactionId"], "tu1");
    assert_eq!(approvals[0]["toolName"], "AskUserQuestion");
    assert_eq!(approvals[0]["input"], input);

    let other = app
        .clone()
        .oneshot(get("/api/agent/approvals?sessionId=someone-else"))
        .await
        .unwrap();
    assert_eq!(body_json(other).await["approvals"], json!([]));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/agent/approvals",
            json!({
                "sessionId": "s-ask",
                "interactionId": "tu1",
                "decision": {"behavior": "allow", "updatedInput": {"answers": {"Proceed?": "yes"}}}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"resolved": true}));

    let events = collect(events).await;
    assert_eq!(error_kind(&events), None);
    let stdin = probe.stdin_messages().await;
    assert!(stdin.iter().any(|m| {
        m["response"]["response"]["updatedInput"]["answers"]["Proceed?"] == "yes"
    }));

    // Second click loses
    let again = app
        .oneshot(post_json(
            "/api/agent/approvals",
            json!({
                "sessionId": "s-ask",
                "interactionId": "tu1",
                "decision": {"behavior": "allow"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(again).await, json!({"resolved": false}));
}

// ─── Sessions ────────────────────────────────────────────────────

#[tokio::test]
async fn test_sessions_list_get_and_abort() {
    let runtime = Arc::new(ScriptedRuntime::new());
    let probe = runtime.push(Script::new().line(init("s-live")).hang()).await;
    let (app, state) = app(runtime, GateConfig::default());

    let mut events = state
        .bridge
        .start(StartRequest {
            project_id: Some(PROJECT.to_string()),
            prompt: "work".to_string(),
            session_id: Some("s-live".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    read_until(&mut events, |e| matches!(e, StreamEvent::Init { .. })).await;

    let list = body_json(app.clone().oneshot(get("/api/agent/sessions")).await.unwrap()).await;
    let sessions = list["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["sessionId"], "s-live");
    assert_eq!(sessions[0]["mode"], "edit");
    assert_eq!(sessions[0]["pendingApprovals"], 0);

    let one = app
        .clone()
        .oneshot(get("/api/agent/sessions/s-live"))
        .await
        .unwrap();
    assert_eq!(one.status(), StatusCode::OK);
    assert_eq!(body_json(one).await["sessionId"], "s-live");

    let missing = app
        .clone()
        .oneshot(get("/api/agent/sessions/nope"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(body_json(missing).await["error"].is_string());

    let abort = app
        .clone()
        .oneshot(post_json("/api/agent/sessions/s-live/abort", json!({})))
        .await
        .unwrap();
    assert_eq!(body_json(abort).await, json!({"aborted": true}));

    let rest = collect(events).await;
    assert_eq!(type_names(&rest), vec!["done"]);
    assert!(probe.was_killed());

    let again = app
        .oneshot(post_json("/api/agent/sessions/s-live/abort", json!({})))
        .await
        .unwrap();
    assert_eq!(body_json(again).await, json!({"aborted": false}));
}
