//! In-process mock venue for end-to-end tests.
//!
//! Speaks the real frame codec over a loopback socket: responds to logins
//! with a scripted reset value per connection, answers pings with pongs,
//! and reports every payload it receives back to the test.

use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tradelink_core::types::SeqNum;
use tradelink_session::{Session, SessionConfig};
use tradelink_wire::{Body, Control, Payload, decode, encode};

use crate::client::Client;

pub struct MockVenue {
    pub addr: String,
    pub received: mpsc::UnboundedReceiver<Payload>,
}

pub async fn read_frame(sock: &mut TcpStream) -> Option<Payload> {
    let mut prefix = [0u8; 4];
    sock.read_exact(&mut prefix).await.ok()?;
    let len = u32::from_be_bytes(prefix) as usize;
    let mut body = vec![0u8; len];
    sock.read_exact(&mut body).await.ok()?;
    Some(decode(&body).expect("mock venue received undecodable frame"))
}

pub async fn write_frame(sock: &mut TcpStream, payload: &Payload) {
    let mut buf = BytesMut::new();
    encode(payload, &mut buf).unwrap();
    sock.write_all(&(buf.len() as u32).to_be_bytes()).await.unwrap();
    sock.write_all(&buf).await.unwrap();
}

/// Starts a venue that serves one connection per entry in `resets`.
///
/// With `drop_after_login`, the first connection is closed right after its
/// login response, simulating a venue-side drop mid-session.
pub async fn spawn_venue(resets: Vec<u32>, drop_after_login: bool) -> MockVenue {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (report, received) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (conn_index, reset) in resets.into_iter().enumerate() {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let mut server_seq = reset;
            let drop_this_conn = drop_after_login && conn_index == 0;

            while let Some(payload) = read_frame(&mut sock).await {
                let body = payload.body.clone();
                let _ = report.send(payload);

                match body {
                    Body::Session(Control::Login { .. }) => {
                        let response = Payload::with_body(
                            SeqNum::new(1),
                            Body::Session(Control::LoginResponse {
                                session: format!("token-{conn_index}"),
                                reset,
                            }),
                        );
                        write_frame(&mut sock, &response).await;
                        if drop_this_conn {
                            break;
                        }
                    }
                    Body::Session(Control::Ping) => {
                        let pong = Payload::with_body(
                            SeqNum::new(server_seq),
                            Body::Session(Control::Pong),
                        );
                        server_seq += 1;
                        write_frame(&mut sock, &pong).await;
                    }
                    Body::Session(Control::Logout { .. }) => break,
                    _ => {}
                }
            }
        }
    });

    MockVenue { addr, received }
}

pub fn config_for(addr: &str) -> SessionConfig {
    let (host, port) = addr.rsplit_once(':').unwrap();
    SessionConfig::new(host, port.parse().unwrap(), "trader", "pw")
        .with_read_timeout(Duration::from_secs(2))
}

pub fn client_for(addr: &str) -> Arc<Client> {
    Arc::new(Client::new(Session::new(config_for(addr))))
}

/// Pulls the next recorded payload, failing the test on a 2 second stall.
pub async fn next_received(venue: &mut MockVenue) -> Payload {
    tokio::time::timeout(Duration::from_secs(2), venue.received.recv())
        .await
        .expect("mock venue received nothing")
        .expect("mock venue channel closed")
}
