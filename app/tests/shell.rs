//! Drive the shell with scripted input against a live server.

use std::sync::Arc;

use tokio::net::TcpListener;
use todo_app::Shell;
use todo_core::view::{TaskCache, EMPTY_MESSAGE};
use todo_core::{InvalidationPolicy, ReqwestTransport, ResourceClient, TodoContext};

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(todo_server::run(listener));
    format!("http://{addr}/api")
}

async fn script(input: &str) -> String {
    let base_url = spawn_server().await;
    let client = ResourceClient::new(&base_url, ReqwestTransport::new(None).unwrap());
    let ctx = TodoContext::new(
        client,
        Arc::new(TaskCache::new()),
        InvalidationPolicy::OnSuccess,
    );
    let mut shell = Shell::mount(&ctx);
    let mut output = Vec::new();
    shell.run(input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn starts_with_title_and_empty_state() {
    let out = script("").await;
    assert!(out.starts_with("Things to do\n"));
    assert!(out.contains(EMPTY_MESSAGE));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_toggle_remove_session() {
    let out = script("add Buy milk\nadd Walk dog\ntoggle 1\nrm 2\nquit\nadd never sent\n").await;
    let frames: Vec<&str> = out.split("Things to do\n").filter(|f| !f.is_empty()).collect();
    assert_eq!(frames.len(), 5, "initial frame plus one per command before quit");

    assert!(frames[1].contains("  1. [ ] Buy milk  (in progress)"));
    assert!(frames[2].contains("  2. [ ] Walk dog  (in progress)"));
    assert!(frames[3].contains("  1. [x] Buy milk  (done)"));
    assert!(frames[4].contains("  1. [x] Buy milk  (done)"));
    assert!(!frames[4].contains("Walk dog"));
    assert!(!out.contains("never sent"));
}

#[tokio::test(flavor = "multi_thread")]
async fn errors_render_inline() {
    let out = script("add\ntoggle 7\nbogus\n").await;
    assert!(out.contains("Body is required"));
    assert!(out.contains("no task #7"));
    assert!(out.contains("unknown command `bogus`"));
}
