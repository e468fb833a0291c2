use serde_json::json;
use sqlroute::{build_router, prepare, server, ClientError, DiscoveryError, ParameterSet, RemoteClient, ServerConfig};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn serve() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("db");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("schema.sql"), "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);").unwrap();
    let config = ServerConfig {
        sql_root: root,
        database_path: dir.path().join("app.db"),
        scaffold: true,
        ..Default::default()
    };
    let router = build_router(prepare(config.clone()).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, router, &config, std::future::pending()).await.unwrap();
    });
    (dir, format!("http://{}", addr))
}

fn args(pairs: &[(&str, serde_json::Value)]) -> ParameterSet {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[tokio::test]
async fn discovers_scaffolded_crud_and_calls_it() {
    let (_dir, base) = serve().await;
    let mut client = RemoteClient::new(base)
        .with_api_base("/api/v1")
        .with_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(client.namespaces().is_none());
    let namespaces = client.discover().await.unwrap();
    let notes = namespaces.namespace("notes").unwrap();
    assert_eq!(notes.len(), 4);

    assert_eq!(client.namespaces().unwrap().namespace("notes").unwrap().len(), 4);

    let created = client
        .call("notes", "insert", &args(&[("columns", json!("body")), ("body", json!("hello"))]))
        .await
        .unwrap();
    assert_eq!(created["rows_affected"], 1);
    let id = created["last_insert_id"].clone();

    let rows = client.call("notes", "select", &ParameterSet::new()).await.unwrap();
    assert_eq!(rows["count"], 1);
    assert_eq!(rows["rows"][0]["body"], "hello");

    let updated = client
        .call("notes", "update", &args(&[("updates", json!("body = ?")), ("body", json!("bye")), ("id", id.clone())]))
        .await
        .unwrap();
    assert_eq!(updated["rows_affected"], 1);

    let deleted = client.call("notes", "delete", &args(&[("id", id)])).await.unwrap();
    assert_eq!(deleted["rows_affected"], 1);
}

#[tokio::test]
async fn builtins_and_unknown_names() {
    let (_dir, base) = serve().await;
    let mut client = RemoteClient::new(base);
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.endpoints, 4);
    let docs = client.docs().await.unwrap();
    assert_eq!(docs.endpoints.len(), 4);

    client.discover().await.unwrap();
    let err = client.call("ghosts", "select", &ParameterSet::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Discovery(DiscoveryError::NamespaceNotFound(_))));
    let err = client.call("notes", "purge", &ParameterSet::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Discovery(DiscoveryError::OperationNotFound { .. })));
}

#[tokio::test]
async fn remote_failure_surfaces_message() {
    let (_dir, base) = serve().await;
    let mut client = RemoteClient::new(base);
    client.discover().await.unwrap();
    // the default insert template needs a column list
    let err = client.call("notes", "insert", &args(&[("body", json!("x"))])).await.unwrap_err();
    match err {
        ClientError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert!(!message.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
}
