//! Shared fixtures: runtime output lines and a bridge over the scripted runtime

#![allow(dead_code)]

use a3s_bridge::runtime::scripted::ScriptedRuntime;
use a3s_bridge::{
    ApprovalGate, EventStream, GateConfig, SessionRegistry, StaticProjects, StreamConfig,
    StreamEvent, StreamingBridge,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

pub const PROJECT: &str = "p1";

pub fn bridge(runtime: Arc<ScriptedRuntime>, gate: GateConfig) -> StreamingBridge {
    bridge_with(runtime, gate, StreamConfig::default())
}

pub fn bridge_with(
    runtime: Arc<ScriptedRuntime>,
    gate: GateConfig,
    stream: StreamConfig,
) -> StreamingBridge {
    StreamingBridge::new(
        runtime,
        Arc::new(SessionRegistry::new()),
        Arc::new(ApprovalGate::new(gate)),
        Arc::new(StaticProjects::new().with(PROJECT, std::env::temp_dir())),
        stream,
    )
}

pub fn init(session_id: &str) -> Value {
    json!({
        "type": "system",
        "subtype": "init",
        "session_id": session_id,
        "tools": ["Read", "Edit", "AskUserQuestion", "ExitPlanMode"],
        "cwd": "/work",
        "model": "sonnet"
    })
}

pub fn assistant_text(text: &str) -> Value {
    json!({
        "type": "assistant",
        "message": {"id": "msg_text", "role": "assistant", "content": [{"type": "text", "text": text}]},
        "parent_tool_use_id": null
    })
}

pub fn assistant_tool_use(tool_use_id: &str, name: &str, input: Value) -> Value {
    json!({
        "type": "assistant",
        "message": {
            "id": "msg_tool",
            "role": "assistant",
            "content": [{"type": "tool_use", "id": tool_use_id, "name": name, "input": input}]
        },
        "parent_tool_use_id": null
    })
}

pub fn can_use_tool(request_id: &str, tool_use_id: &str, tool_name: &str, input: Value) -> Value {
    json!({
        "type": "control_request",
        "request_id": request_id,
        "request": {
            "subtype": "can_use_tool",
            "tool_name": tool_name,
            "input": input,
            "tool_use_id": tool_use_id
        }
    })
}

pub fn result_success() -> Value {
    json!({
        "type": "result",
        "subtype": "success",
        "is_error": false,
        "result": "All done",
        "total_cost_usd": 0.02,
        "duration_ms": 1200,
        "num_turns": 2,
        "usage": {"input_tokens": 100, "output_tokens": 40}
    })
}

/// Read events until `pred` matches, returning everything read so far
pub async fn read_until(
    events: &mut EventStream,
    pred: impl Fn(&StreamEvent) -> bool,
) -> Vec<StreamEvent> {
    let mut seen = Vec::new();
    let read = async {
        while let Some(event) = events.next().await {
            let done = pred(&event);
            seen.push(event);
            if done {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), read)
        .await
        .expect("timed out waiting for event");
    seen
}

/// Read the stream to its end
pub async fn collect(events: EventStream) -> Vec<StreamEvent> {
    tokio::time::timeout(Duration::from_secs(10), events.collect::<Vec<_>>())
        .await
        .expect("stream did not end")
}

/// Poll until `check` holds
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let wait = async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .expect("condition never held");
}

pub fn error_kind(events: &[StreamEvent]) -> Option<&'static str> {
    events.iter().find_map(|e| match e {
        StreamEvent::Error { kind, .. } => Some(kind.as_str()),
        _ => None,
    })
}

pub fn type_names(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["type"].as_str().unwrap().to_string())
        .collect()
}
