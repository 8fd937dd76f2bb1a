//! REST client behavior against a mock HTTP server: payload shapes, auth
//! headers, query parameters and error mapping.

use httpmock::prelude::*;
use serde_json::json;

use mediq_link::{MediqClient, MediqLinkError, QueueStatus};

fn sample_queue() -> serde_json::Value {
    json!([
        {"id": 1, "number": "A001", "name": "Siti", "status": "onProcess", "estimatedTime": "5 menit"},
        {"id": 2, "number": "A002", "name": "Adi", "status": "waiting"}
    ])
}

#[tokio::test]
async fn get_queue_parses_bare_array_and_sends_scope() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/queue")
                .query_param("institutionId", "inst-1")
                .header("authorization", "Bearer tok-1")
                .header("x-api-key", "key-1");
            then.status(200).json_body(sample_queue());
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .token("tok-1")
        .api_key("key-1")
        .build()
        .unwrap();

    let entries = client.get_queue(Some("inst-1")).await.unwrap();
    mock.assert_async().await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "1");
    assert_eq!(entries[0].status, QueueStatus::InProgress);
    assert_eq!(entries[1].status, QueueStatus::Waiting);
}

#[tokio::test]
async fn get_queue_parses_wrapped_shapes() {
    let server = MockServer::start_async().await;

    let wrapped = server
        .mock_async(|when, then| {
            when.method(GET).path("/queue").query_param("institutionId", "w");
            then.status(200).json_body(json!({"queue": sample_queue()}));
        })
        .await;
    let keyed = server
        .mock_async(|when, then| {
            when.method(GET).path("/queue").query_param("institutionId", "k");
            then.status(200).json_body(json!({"queueData": sample_queue()}));
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();

    assert_eq!(client.get_queue(Some("w")).await.unwrap().len(), 2);
    assert_eq!(client.get_queue(Some("k")).await.unwrap().len(), 2);
    wrapped.assert_async().await;
    keyed.assert_async().await;
}

#[tokio::test]
async fn get_institutions_parses_directory() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/institutions");
            then.status(200).json_body(json!([
                {"id": 1, "name": "Puskesmas Melati", "address": "Jl. Melati 1"},
                {"id": "rs-2", "name": "RS Harapan"}
            ]));
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();

    let institutions = client.get_institutions().await.unwrap();
    assert_eq!(institutions.len(), 2);
    assert_eq!(institutions[0].id, "1");
    assert_eq!(institutions[1].name, "RS Harapan");
    assert!(institutions[1].address.is_none());
}

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/queue");
            then.status(503).body("maintenance window");
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();

    match client.get_queue(None).await {
        Err(MediqLinkError::ApiError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected ApiError, got {:?}", other.map(|v| v.len())),
    }
}

#[tokio::test]
async fn call_queue_posts_to_the_call_endpoint() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/queue/q-17/call");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();

    client.call_queue("q-17").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn update_queue_status_patches_canonical_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/queue/q-17/status")
                .json_body(json!({"status": "in-progress"}));
            then.status(200);
        })
        .await;

    let client = MediqClient::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();

    client
        .update_queue_status("q-17", QueueStatus::InProgress)
        .await
        .unwrap();
    mock.assert_async().await;
}
