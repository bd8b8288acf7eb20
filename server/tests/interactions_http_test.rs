//! Interaction Endpoint HTTP Tests
//!
//! Drives signed interactions through the full router with
//! `tower::ServiceExt::oneshot` and checks the status, headers and body
//! written for each kind of interaction.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use helpers::{body_bytes, body_to_json, interaction, TestApp, TIMESTAMP};
use hookwire_server::interactions::{
    Command, CommandInteraction, ComponentInteraction, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use hw_common::{Choice, CommandOption, OptionType, ResponseData};
use serde_json::json;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_non_post_is_method_not_allowed() {
    let app = TestApp::new();
    let response = app
        .oneshot(TestApp::request(Method::GET, "/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized_before_parsing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = TestApp::with(move |builder| {
        builder.on_interaction(move |_interaction, _client| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {}
        })
    });

    // Not even JSON: an unsigned body must be rejected with 401, not 400
    let response = app
        .oneshot(
            TestApp::request(Method::POST, "/")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_to_json(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_tampered_body_is_unauthorized() {
    let app = TestApp::new();
    let original = br#"{"id":"1","application_id":"1","type":1}"#;
    let tampered = br#"{"id":"2","application_id":"1","type":1}"#;

    let response = app
        .oneshot(
            TestApp::request(Method::POST, "/")
                .header(SIGNATURE_HEADER, helpers::sign(TIMESTAMP, original))
                .header(TIMESTAMP_HEADER, TIMESTAMP)
                .body(Body::from(tampered.to_vec()))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_garbage_is_bad_request() {
    let app = TestApp::new();
    let response = app.oneshot(TestApp::signed(b"{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ping_gets_pong() {
    let app = TestApp::new();
    let response = app.send_interaction(&interaction(1, false, json!({}))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(&body_bytes(response).await[..], br#"{"type":1}"#);
}

#[tokio::test]
async fn test_unknown_command_gets_fixed_ephemeral_reply() {
    let app = TestApp::new();
    let response = app
        .send_interaction(&interaction(2, true, json!({"name": "removed"})))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response).await,
        json!({
            "type": 4,
            "data": {"content": "Unknown command. It may have been removed.", "flags": 64}
        })
    );
}

#[tokio::test]
async fn test_guild_only_command_in_dm_is_silent() {
    let pre_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pre_calls);
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();

    let app = TestApp::with(move |builder| {
        builder
            .register_command(Command::new(
                "ban",
                "Ban a member",
                move |_ctx: CommandInteraction| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(());
                    }
                },
            ))
            .unwrap()
            .before_command(move |_ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            })
    });

    let response = app
        .send_interaction(&interaction(2, false, json!({"name": "ban"})))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(pre_calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_command_follow_up_goes_through_rest() {
    let app = TestApp::with(|builder| {
        builder
            .register_command(Command::new(
                "echo",
                "Repeat text",
                |ctx: CommandInteraction| async move {
                    let text = ctx
                        .option("text")
                        .and_then(|o| o.as_str())
                        .unwrap_or_default()
                        .to_string();
                    ctx.send_followup(&ResponseData::text(text)).await.unwrap();
                },
            ))
            .unwrap()
    });

    let response = app
        .send_interaction(&interaction(
            2,
            true,
            json!({"name": "echo", "options": [{"name": "text", "type": 3, "value": "hi there"}]}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The handler runs after the reply; give it a moment
    let mut requests = Vec::new();
    for _ in 0..50 {
        requests = app.transport.requests();
        if !requests.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://127.0.0.1:9/webhooks/1/tok");
    assert_eq!(requests[0].body.as_deref(), Some(r#"{"content":"hi there"}"#));
}

#[tokio::test]
async fn test_component_wait_is_acknowledged_and_fires_once() {
    let app = TestApp::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let counter = Arc::clone(&fired);
    app.client
        .arm_components(["vote:up", "vote:down"], Duration::from_secs(1), move |outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(outcome.delivered().map(|ctx| ctx.custom_id().to_string()));
        })
        .unwrap();

    let response = app
        .send_interaction(&interaction(
            3,
            true,
            json!({"custom_id": "vote:up", "component_type": 2}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!({"type": 6}));

    let delivered = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap();
    assert_eq!(delivered, Some(Some("vote:up".to_string())));

    // Sibling key went with it
    assert!(!app.client.component_waits().is_armed("vote:down"));
    let response = app
        .send_interaction(&interaction(
            3,
            true,
            json!({"custom_id": "vote:down", "component_type": 2}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Well past the deadline: no timeout callback after delivery
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_permanent_component_handler_owns_reply() {
    let app = TestApp::with(|builder| {
        builder
            .register_component("counter:inc", |ctx: ComponentInteraction| async move {
                ctx.update_message(ResponseData::text("1"))
            })
            .unwrap()
    });

    let response = app
        .send_interaction(&interaction(
            3,
            true,
            json!({"custom_id": "counter:inc", "component_type": 2}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response).await,
        json!({"type": 7, "data": {"content": "1"}})
    );
}

#[tokio::test]
async fn test_autocomplete_writes_choices_as_json() {
    let app = TestApp::with(|builder| {
        builder
            .register_command(
                Command::new("fruit", "Pick a fruit", |_ctx| async {})
                    .option(
                        CommandOption::new(OptionType::String, "name", "fruit name")
                            .required()
                            .autocomplete(),
                    )
                    .autocomplete(|ctx| {
                        let typed = ctx.focused_value().unwrap_or_default();
                        ["apple", "apricot", "banana"]
                            .into_iter()
                            .filter(|fruit| fruit.starts_with(typed))
                            .map(|fruit| Choice::new(fruit, fruit))
                            .collect()
                    }),
            )
            .unwrap()
    });

    let response = app
        .send_interaction(&interaction(
            4,
            true,
            json!({"name": "fruit", "options": [{"name": "name", "type": 3, "value": "ap", "focused": true}]}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        body_to_json(response).await,
        json!({"type": 8, "data": {"choices": [
            {"name": "apple", "value": "apple"},
            {"name": "apricot", "value": "apricot"}
        ]}})
    );
}

#[tokio::test]
async fn test_modal_wait_over_http() {
    let app = TestApp::new();
    let waiter = {
        let client = Arc::clone(&app.client);
        tokio::spawn(async move { client.await_modal("profile", Duration::from_secs(1)).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let response = app
        .send_interaction(&interaction(
            5,
            true,
            json!({
                "custom_id": "profile",
                "components": [{"type": 1, "components": [
                    {"type": 4, "custom_id": "bio", "value": "hello"}
                ]}]
            }),
        ))
        .await;
    assert_eq!(body_to_json(response).await, json!({"type": 6}));

    let modal = waiter.await.unwrap().unwrap().delivered().unwrap();
    assert_eq!(modal.field_value("bio"), Some("hello"));
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = app
        .oneshot(TestApp::request(Method::GET, "/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!({"status": "ok"}));
}
