//! End-to-end tests against a live server on an ephemeral port.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use agenda_gateway::api;
use agenda_gateway::app_state::AppState;
use agenda_gateway::domain::EventBus;
use agenda_gateway::persistence::SnapshotStore;
use agenda_gateway::service::{ScheduleState, SchedulingService};
use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

async fn spawn_app(store: Option<SnapshotStore>) -> SocketAddr {
    let service = SchedulingService::new(ScheduleState::default(), EventBus::new(64), store);
    let Ok(_) = service.restore_snapshot().await else {
        panic!("restore failed");
    };
    let app = api::build_app(AppState::new(service), Duration::from_secs(5));
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let Ok(response) = client.post(url).json(&body).send().await else {
        panic!("request failed");
    };
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let Ok(response) = client.get(url).send().await else {
        panic!("request failed");
    };
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn register(client: &reqwest::Client, addr: SocketAddr, names: &[&str]) {
    for name in names {
        let (status, _) = post(
            client,
            format!("http://{addr}/api/v1/users"),
            json!({ "username": name }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register {name}");
    }
}

fn meeting(title: &str, host: &str, participants: &[&str], start: &str, end: &str) -> Value {
    json!({
        "title": title,
        "host": host,
        "participants": participants,
        "start": start,
        "end": end,
    })
}

#[tokio::test]
async fn double_booking_is_refused() {
    let addr = spawn_app(None).await;
    let client = reqwest::Client::new();
    register(&client, addr, &["alice", "bob", "carol"]).await;

    let (status, body) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "planning",
            "alice",
            &["bob"],
            "2024-05-01T00:00:00Z",
            "2024-05-03T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "planning");

    let (status, body) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "review",
            "carol",
            &["bob"],
            "2024-05-02T00:00:00Z",
            "2024-05-04T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2103);

    // Adjacent ranges do not collide.
    let (status, _) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "review",
            "carol",
            &["bob"],
            "2024-05-03T00:00:00Z",
            "2024-05-04T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&client, format!("http://{addr}/api/v1/users/bob/meetings")).await;
    assert_eq!(status, StatusCode::OK);
    let Some(data) = body["data"].as_array() else {
        panic!("expected data array");
    };
    assert_eq!(data.len(), 2);
}

#[tokio::test]
async fn last_participant_leaving_prunes_meeting() {
    let addr = spawn_app(None).await;
    let client = reqwest::Client::new();
    register(&client, addr, &["alice", "bob"]).await;

    let (status, _) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "pairing",
            "alice",
            &["bob"],
            "2024-07-01T00:00:00Z",
            "2024-07-02T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let Ok(response) = client
        .delete(format!(
            "http://{addr}/api/v1/meetings/pairing/participants/bob"
        ))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let Ok(body) = response.json::<Value>().await else {
        panic!("expected JSON");
    };
    assert_eq!(body["pruned"], true);

    let (status, body) = get(&client, format!("http://{addr}/api/v1/meetings/pairing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn websocket_streams_events_for_followed_users() {
    let addr = spawn_app(None).await;
    let client = reqwest::Client::new();
    register(&client, addr, &["alice", "bob"]).await;

    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "s1",
        "type": "command",
        "timestamp": "2024-01-01T00:00:00Z",
        "payload": { "command": "subscribe", "usernames": ["bob"] },
    });
    let Ok(()) = socket.send(Message::text(subscribe.to_string())).await else {
        panic!("ws send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "s1");

    let (status, _) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "sync",
            "alice",
            &["bob"],
            "2024-08-01T00:00:00Z",
            "2024-08-02T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "meeting_hosted");
    assert_eq!(event["payload"]["title"], "sync");
}

async fn next_json<S>(socket: &mut S) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
    else {
        panic!("no ws message");
    };
    let Ok(text) = msg.to_text() else {
        panic!("expected text frame");
    };
    let Ok(json) = serde_json::from_str(text) else {
        panic!("expected JSON frame");
    };
    json
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let Ok(tmp) = tempfile::tempdir() else {
        panic!("tempdir");
    };
    let addr = spawn_app(Some(SnapshotStore::new(tmp.path()))).await;
    let client = reqwest::Client::new();
    register(&client, addr, &["alice", "bob"]).await;
    let (status, _) = post(
        &client,
        format!("http://{addr}/api/v1/meetings"),
        meeting(
            "offsite",
            "alice",
            &["bob"],
            "2024-09-10T00:00:00Z",
            "2024-09-12T00:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&client, format!("http://{addr}/admin/snapshot"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
    assert_eq!(body["meetings"], 1);

    let restarted = spawn_app(Some(SnapshotStore::new(tmp.path()))).await;
    let (status, body) = get(
        &client,
        format!("http://{restarted}/api/v1/meetings/offsite"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["host"], "alice");
    assert_eq!(body["participants"], json!(["bob"]));
}
