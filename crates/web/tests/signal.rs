#![cfg(unix)]

use nano_http::protocol::{Request, Response};
use nano_web::{Router, Server, handler_fn};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::{sleep, timeout};

fn free_port() -> u16 {
    std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap().local_addr().unwrap().port()
}

#[tokio::test]
async fn terminate_signal_stops_a_started_server() {
    let mut router = Router::new();
    router.get("/", handler_fn(|_req: &Request, _resp: &mut Response| {})).unwrap();

    let port = free_port();
    let server = Server::builder().router(router).address(Ipv4Addr::LOCALHOST).port(port).build().unwrap();
    let server_task = tokio::spawn(server.start());

    // the signal handler is installed before the listener is bound
    timeout(Duration::from_secs(5), async {
        while TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_err() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    let status = Command::new("kill").args(["-TERM", &std::process::id().to_string()]).status().await.unwrap();
    assert!(status.success());

    timeout(Duration::from_secs(5), server_task).await.unwrap().unwrap().unwrap();
}
