//! Minimal venue client: connect, authenticate, heartbeat, log out.
//!
//! Venue address and credentials come from the environment:
//! `VENUE_HOST`, `VENUE_PORT`, `VENUE_USER`, `VENUE_PASSWORD`.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tradelink::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let host = std::env::var("VENUE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("VENUE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3701);
    let user = std::env::var("VENUE_USER").unwrap_or_else(|_| "trader".to_string());
    let password = std::env::var("VENUE_PASSWORD").unwrap_or_default();

    let config = SessionConfig::new(host, port, user, password)
        .with_read_timeout(Duration::from_secs(15));
    let client = Arc::new(Client::new(Session::new(config)));

    let on_pong: Handler = Arc::new(|payload| {
        info!("pong received, seq={}", payload.seq);
        Ok(())
    });
    client.add_handler("session.pong", &on_pong);

    let sender = SendWorker::spawn(Arc::clone(&client));
    sender.enqueue_login().await;
    if !sender.login_complete(Duration::from_secs(10)).await {
        error!("login did not complete");
        return Ok(());
    }

    let mut receiver = ReceiveLoop::spawn(Arc::clone(&client));
    let Some((name, _login)) = receiver.next(Duration::from_secs(10)).await else {
        error!("no login response");
        return Ok(());
    };
    info!("authenticated: {}", name);

    sender
        .enqueue(WorkItem::new(|client| async move { client.ping().await }))
        .await;
    if let Some((name, _payload)) = receiver.next(Duration::from_secs(10)).await {
        info!("received {}", name);
    }

    sender
        .enqueue(WorkItem::new(|client| async move {
            client.logout().await;
            Ok(())
        }))
        .await;

    sender.stop();
    receiver.stop();
    sender.join().await;
    receiver.join().await;
    Ok(())
}
