//! End-to-end over a real TCP socket.

use squirreld::{new_shared_store, server, JsonFilePersistence, SquirrelStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Send one raw HTTP/1.1 request and return the full response text
async fn raw_request(addr: SocketAddr, method: &str, path: &str, form: Option<&str>) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let mut request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n",
        method, path, addr
    );
    match form {
        Some(form) => request.push_str(&format!(
            "Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            form.len(),
            form
        )),
        None => request.push_str("Content-Length: 0\r\n\r\n"),
    }
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn test_serves_over_tcp_until_shutdown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squirrel_db.json");

    let store = SquirrelStore::open(Arc::new(JsonFilePersistence::new(&path)))
        .await
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server::serve(listener, new_shared_store(store), async move {
        let _ = shutdown_rx.await;
    }));

    let response = raw_request(addr, "POST", "/squirrels", Some("name=Fluffy&size=large")).await;
    assert_eq!(status_line(&response), "HTTP/1.1 201 Created");

    let response = raw_request(addr, "GET", "/squirrels/1", None).await;
    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains(r#"{"id":1,"name":"Fluffy","size":"large"}"#));

    let response = raw_request(addr, "GET", "/squirrels/abc", None).await;
    assert_eq!(status_line(&response), "HTTP/1.1 404 Not Found");
    assert!(response.ends_with("404 Not Found"));

    let response = raw_request(addr, "PATCH", "/unknown", None).await;
    assert_eq!(status_line(&response), "HTTP/1.1 501 Not Implemented");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    // The write behind the 201 reached disk
    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk["next_id"], 2);
    assert_eq!(on_disk["squirrels"][0]["name"], "Fluffy");
}
