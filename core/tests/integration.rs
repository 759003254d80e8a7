//! Full lifecycle against the server over real HTTP.
//!
//! Starts the server on a random port and drives every resource-client
//! operation through `ReqwestTransport`.

use std::time::Duration;

use todo_core::{ApiError, ReqwestTransport, ResourceClient};

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(todo_server::run(listener));
    format!("http://{addr}/api")
}

fn client(base_url: &str) -> ResourceClient {
    ResourceClient::new(base_url, ReqwestTransport::new(None).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn crud_lifecycle() {
    let client = client(&spawn_server().await);

    // Step 1: list — should be empty.
    assert!(client.list().await.unwrap().is_empty(), "expected empty list");

    // Step 2: create.
    let created = client.create("Buy milk").await.unwrap();
    assert_eq!(created.text, "Buy milk");
    assert!(!created.completed);
    let id = created.id.clone();

    // Step 3: exactly one task.
    let tasks = client.list().await.unwrap();
    assert_eq!(tasks, vec![created]);

    // Step 4: toggle twice.
    assert!(client.set_completed(&id, true).await.unwrap().completed);
    assert!(!client.set_completed(&id, false).await.unwrap().completed);

    // Step 5: setting the same value again is a no-op.
    let same = client.set_completed(&id, false).await.unwrap();
    assert!(!same.completed);
    assert_eq!(same.text, "Buy milk");

    // Step 6: delete, then delete again.
    client.remove(&id).await.unwrap();
    assert_eq!(client.remove(&id).await.unwrap_err(), ApiError::NotFound);
    assert_eq!(
        client.set_completed(&id, true).await.unwrap_err(),
        ApiError::NotFound
    );

    // Step 7: list — empty again.
    assert!(client.list().await.unwrap().is_empty(), "expected empty list after delete");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_text_is_rejected_by_server() {
    let client = client(&spawn_server().await);

    let err = client.create("").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 400,
            message: "Body is required".to_string()
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}/api"));
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_timeout_surfaces_as_network_error() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let transport = ReqwestTransport::new(Some(Duration::from_millis(200))).unwrap();
    let client = ResourceClient::new(&format!("http://{addr}/api"), transport);
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}
