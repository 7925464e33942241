/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Concurrency harness: one outbound worker, one inbound loop.
//!
//! The session tolerates exactly one sender and one reader; this module
//! enforces that by construction. Application calls are serialized through
//! the [`SendWorker`]'s FIFO queue and executed to completion one at a
//! time; inbound payloads are read by the [`ReceiveLoop`] and republished,
//! with their derived event names, onto a second FIFO queue. The two
//! activities cooperate only through queues: the worker never reads, the
//! loop never writes, and the login handshake happens-before the loop
//! starts via the login latch.
//!
//! Stopping is cooperative: each loop checks its stop flag every iteration,
//! and every blocking wait is timeout-bounded so the flag is observed
//! promptly. A disconnect ends the inbound loop cleanly; reconnection is an
//! explicit external action, never automatic.

use crate::client::Client;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use tradelink_core::error::Result;
use tradelink_wire::Payload;

/// How long a blocked queue wait may last before the stop flag is
/// re-checked.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outbound queue depth.
const WORK_QUEUE_DEPTH: usize = 64;

/// Inbound republish queue depth.
const INBOX_DEPTH: usize = 256;

type Action = Box<dyn FnOnce(Arc<Client>) -> BoxFuture<'static, Result<()>> + Send>;

/// One queued application call, executed by the outbound worker in
/// submission order.
pub struct WorkItem {
    action: Action,
    is_login: bool,
}

impl WorkItem {
    /// Wraps an application call as a work item.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Arc<Client>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            action: Box::new(move |client| Box::pin(f(client))),
            is_login: false,
        }
    }

    /// The connect-and-login work item.
    ///
    /// Uses the deferred login so the response is consumed by the inbound
    /// loop; after execution the worker latches the login-complete signal.
    #[must_use]
    pub fn login() -> Self {
        Self {
            action: Box::new(|client| Box::pin(async move { client.login(false).await })),
            is_login: true,
        }
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem")
            .field("is_login", &self.is_login)
            .finish_non_exhaustive()
    }
}

/// The single task allowed to send on a shared client.
#[derive(Debug)]
pub struct SendWorker {
    queue: mpsc::Sender<WorkItem>,
    stop: Arc<AtomicBool>,
    login_rx: watch::Receiver<bool>,
    handle: JoinHandle<()>,
}

impl SendWorker {
    /// Spawns the worker loop over `client`.
    #[must_use]
    pub fn spawn(client: Arc<Client>) -> Self {
        let (queue, mut rx) = mpsc::channel::<WorkItem>(WORK_QUEUE_DEPTH);
        let (login_tx, login_rx) = watch::channel(false);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = tokio::spawn(async move {
            loop {
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                let item = match timeout(POLL_INTERVAL, rx.recv()).await {
                    Err(_) => continue,
                    Ok(None) => break,
                    Ok(Some(item)) => item,
                };

                let is_login = item.is_login;
                if let Err(err) = (item.action)(Arc::clone(&client)).await {
                    warn!("work item failed: {}", err);
                }
                if is_login {
                    debug!("latching login complete");
                    let _ = login_tx.send(true);
                }
            }
            debug!("send worker finished");
        });

        Self {
            queue,
            stop,
            login_rx,
            handle,
        }
    }

    /// Enqueues the connect-and-login work item.
    ///
    /// Returns false when the worker has already stopped.
    pub async fn enqueue_login(&self) -> bool {
        self.queue.send(WorkItem::login()).await.is_ok()
    }

    /// Enqueues a work item. FIFO per caller; each item runs to completion
    /// before the next is dequeued.
    ///
    /// Returns false when the worker has already stopped.
    pub async fn enqueue(&self, item: WorkItem) -> bool {
        self.queue.send(item).await.is_ok()
    }

    /// Waits for the login work item to finish executing.
    ///
    /// Returns false if `wait` elapses first.
    pub async fn login_complete(&self, wait: Duration) -> bool {
        let mut rx = self.login_rx.clone();
        matches!(timeout(wait, rx.wait_for(|done| *done)).await, Ok(Ok(_)))
    }

    /// Requests a cooperative stop; observed within the poll interval.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the worker task to finish.
    pub async fn join(self) {
        drop(self.queue);
        let _ = self.handle.await;
    }
}

/// The single task allowed to read on a shared client.
///
/// Republishes every inbound payload with its derived event name. Ends
/// cleanly on disconnect instead of retrying.
#[derive(Debug)]
pub struct ReceiveLoop {
    inbox: mpsc::Receiver<(String, Payload)>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ReceiveLoop {
    /// Spawns the inbound loop over `client`.
    ///
    /// Call only after the login handshake has been sent; waiting on
    /// [`SendWorker::login_complete`] provides the ordering.
    #[must_use]
    pub fn spawn(client: Arc<Client>) -> Self {
        let (tx, inbox) = mpsc::channel(INBOX_DEPTH);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = tokio::spawn(async move {
            loop {
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match client.read().await {
                    Ok(payload) => {
                        let name = payload.event_name().to_string();
                        if tx.send((name, payload)).await.is_err() {
                            debug!("inbox dropped, receive loop finishing");
                            break;
                        }
                    }
                    Err(err) if err.is_disconnect() => {
                        // The clean stop condition: reconnecting is the
                        // owner's decision, not ours.
                        info!("socket disconnected, receive loop finishing");
                        break;
                    }
                    Err(err) => {
                        warn!("receive loop stopping on error: {}", err);
                        break;
                    }
                }
            }
            debug!("receive loop finished");
        });

        Self {
            inbox,
            stop,
            handle,
        }
    }

    /// Pulls the next republished `(event name, payload)` pair, waiting at
    /// most `wait`.
    pub async fn next(&mut self, wait: Duration) -> Option<(String, Payload)> {
        timeout(wait, self.inbox.recv()).await.ok().flatten()
    }

    /// Requests a cooperative stop; observed once the current bounded read
    /// returns.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the loop task to finish.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{client_for, spawn_venue};
    use tradelink_session::SessionState;

    #[tokio::test]
    async fn test_sender_and_receiver_share_one_session() {
        let venue = spawn_venue(vec![2], false).await;
        let client = client_for(&venue.addr);

        let sender = SendWorker::spawn(Arc::clone(&client));
        assert!(sender.enqueue_login().await);
        assert!(sender.login_complete(Duration::from_secs(5)).await);

        // Login is sent before the receiver starts; the response arrives
        // through the normal read path.
        let mut receiver = ReceiveLoop::spawn(Arc::clone(&client));
        let (name, payload) = receiver.next(Duration::from_secs(2)).await.unwrap();
        assert_eq!(name, "session.login_response");
        assert_eq!(payload.event_name(), "session.login_response");
        assert_eq!(client.session().state(), SessionState::Authenticated);
        assert_eq!(client.session().sequences(), (2, 2));

        // Work items execute in submission order on the single sender.
        sender
            .enqueue(WorkItem::new(|client| async move { client.ping().await }))
            .await;
        let (name, _pong) = receiver.next(Duration::from_secs(2)).await.unwrap();
        assert_eq!(name, "session.pong");

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
    }

    #[tokio::test]
    async fn test_login_latch_times_out_without_login() {
        let venue = spawn_venue(vec![2], false).await;
        let client = client_for(&venue.addr);

        let sender = SendWorker::spawn(Arc::clone(&client));
        assert!(!sender.login_complete(Duration::from_millis(100)).await);

        sender.stop();
        sender.join().await;
    }

    #[tokio::test]
    async fn test_dropped_connection_ends_loop_and_fresh_login_resets() {
        // First connection is dropped by the venue right after login; the
        // second serves a different reset value.
        let venue = spawn_venue(vec![2, 5], true).await;
        let client = client_for(&venue.addr);

        client.login(true).await.unwrap();
        assert_eq!(client.session().sequences(), (2, 2));

        // The venue has already closed the socket; the loop must end
        // cleanly on the disconnect rather than crash or spin.
        let receiver = ReceiveLoop::spawn(Arc::clone(&client));
        receiver.join().await;
        assert_eq!(client.session().state(), SessionState::Disconnected);

        // An explicit fresh connect + login cycle resynchronizes both
        // counters to the new server-issued reset.
        client.login(true).await.unwrap();
        assert_eq!(client.session().state(), SessionState::Authenticated);
        assert_eq!(client.session().sequences(), (5, 5));
    }

    #[tokio::test]
    async fn test_worker_stops_promptly_when_idle() {
        let venue = spawn_venue(vec![2], false).await;
        let client = client_for(&venue.addr);

        let sender = SendWorker::spawn(client);
        sender.stop();
        // Bounded queue waits guarantee the flag is seen within one poll
        // interval.
        timeout(POLL_INTERVAL * 4, sender.join())
            .await
            .expect("worker did not observe stop flag");
        drop(venue);
    }
}
