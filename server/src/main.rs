use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_env("TODO_SERVER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("todo_server=info"));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "4000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    todo_server::run(listener).await
}
