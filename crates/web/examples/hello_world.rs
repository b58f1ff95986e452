use nano_http::protocol::{Request, Response};
use nano_web::{Router, Server, handler_fn};
use std::net::Ipv4Addr;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

fn hello_world(_req: &Request, resp: &mut Response) {
    resp.set_header("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref());
    resp.append_body("hello world");
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut router = Router::new();
    router.get("/", handler_fn(hello_world)).expect("route must be valid");

    let server = Server::builder()
        .router(router)
        .address(Ipv4Addr::LOCALHOST)
        .port(3000)
        .build()
        .expect("router is set");

    if let Err(e) = server.start().await {
        error!(cause = %e, "server failed");
    }
}
