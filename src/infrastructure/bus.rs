use super::endpoint;
use crate::config::BusConfig;
use crate::domain::ports::FrameHandlerRef;
use crate::error::{LakeError, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info};

type Backlog = Arc<Mutex<Vec<String>>>;

/// Broker endpoint pair emulating the lake.
///
/// Frames pushed to the ingress endpoint are consumed by a single background
/// listener which records them in a backlog, loops back anything not meant for
/// the vault and hands vault messages to the configured [`FrameHandler`].
/// Replies and looped back frames are published on the egress endpoint.
///
/// The backlog is guarded by one mutex shared by the listener and the
/// inspection methods (`mailbox`, `pulled_message`, `ack`, `reset`).
///
/// [`FrameHandler`]: crate::domain::ports::FrameHandler
pub struct LakeBus {
    config: BusConfig,
    handler: FrameHandlerRef,
    backlog: Backlog,
    muted: Arc<AtomicBool>,
    shutting_down: AtomicBool,
    live: RwLock<Option<Live>>,
    tasks: tokio::sync::Mutex<Option<Tasks>>,
}

/// What callers need while the lake runs.
#[derive(Clone)]
struct Live {
    publisher: broadcast::Sender<String>,
    ingress: SocketAddr,
    egress: SocketAddr,
}

struct Tasks {
    terminate: Arc<AtomicBool>,
    listener: JoinHandle<()>,
    ingress: JoinHandle<()>,
    egress: JoinHandle<()>,
}

impl LakeBus {
    pub fn new(config: BusConfig, handler: FrameHandlerRef) -> Self {
        Self {
            config,
            handler,
            backlog: Arc::default(),
            muted: Arc::default(),
            shutting_down: AtomicBool::new(false),
            live: RwLock::new(None),
            tasks: tokio::sync::Mutex::new(None),
        }
    }

    /// Binds both endpoints and spawns the listener.
    ///
    /// Fails when either endpoint cannot be bound, when the lake already runs
    /// or while a `stop` is in progress. Clears the backlog and resumes a
    /// silenced lake.
    pub async fn start(&self) -> Result<()> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(LakeError::ShuttingDown);
        }
        let mut tasks = self.tasks.lock().await;
        if tasks.is_some() {
            return Err(LakeError::AlreadyRunning);
        }

        let ingress = endpoint::bind("ingress", &self.config.ingress).await?;
        let egress = endpoint::bind("egress", &self.config.egress).await?;
        let ingress_addr = ingress.local_addr()?;
        let egress_addr = egress.local_addr()?;

        let (frames_tx, frames_rx) = mpsc::channel(self.config.ingress_capacity.max(1));
        let (publisher, _) = broadcast::channel(self.config.egress_capacity.max(1));

        self.reset();
        self.muted.store(false, Ordering::Release);

        let terminate = Arc::new(AtomicBool::new(false));
        let listener = Listener {
            frames: frames_rx,
            terminate: Arc::clone(&terminate),
            poll_interval: self.config.poll_interval,
            relay: Relay {
                publisher: publisher.clone(),
                backlog: Arc::clone(&self.backlog),
                handler: Arc::clone(&self.handler),
                muted: Arc::clone(&self.muted),
            },
        };

        *tasks = Some(Tasks {
            terminate,
            listener: tokio::spawn(listener.run()),
            ingress: endpoint::spawn_ingress(ingress, frames_tx),
            egress: endpoint::spawn_egress(egress, publisher.clone()),
        });
        *self.live.write().unwrap_or_else(PoisonError::into_inner) = Some(Live {
            publisher,
            ingress: ingress_addr,
            egress: egress_addr,
        });

        info!(ingress = %ingress_addr, egress = %egress_addr, "lake started");
        Ok(())
    }

    /// Terminates the listener, releases both endpoints and forgets them so
    /// that a later `start` begins from scratch. Does nothing when the lake is
    /// not running.
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;
        let Some(running) = tasks.take() else {
            return;
        };
        self.shutting_down.store(true, Ordering::Release);
        running.terminate.store(true, Ordering::Release);

        if let Err(err) = running.listener.await {
            debug!(%err, "listener ended abnormally");
        }

        running.ingress.abort();
        running.egress.abort();
        for task in [running.ingress, running.egress] {
            if let Err(err) = task.await
                && !err.is_cancelled()
            {
                debug!(%err, "endpoint ended abnormally");
            }
        }

        *self.live.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.shutting_down.store(false, Ordering::Release);
        info!("lake stopped");
    }

    /// Publishes `frame` on egress. Silently dropped when the lake is not
    /// running or nobody subscribes.
    pub fn send(&self, frame: impl Into<String>) {
        if let Some(live) = self.live() {
            let _ = live.publisher.send(frame.into());
        }
    }

    /// Received frames not yet acknowledged, oldest first.
    pub fn mailbox(&self) -> Vec<String> {
        lock(&self.backlog).clone()
    }

    /// Whether `expected` is among the unacknowledged frames.
    pub fn pulled_message(&self, expected: &str) -> bool {
        lock(&self.backlog).iter().any(|frame| frame == expected)
    }

    /// Removes every unacknowledged frame equal to `frame`.
    pub fn ack(&self, frame: &str) {
        lock(&self.backlog).retain(|item| item != frame);
    }

    /// Drops every unacknowledged frame.
    pub fn reset(&self) {
        lock(&self.backlog).clear();
    }

    /// Discards every received frame until [`resume`](Self::resume).
    pub fn silence(&self) {
        self.muted.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.muted.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.live().is_some()
    }

    /// In-process egress subscription; receives frames published after the
    /// call.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<String>> {
        self.live().map(|live| live.publisher.subscribe())
    }

    /// Egress subscribers currently attached, sockets and in-process alike.
    pub fn subscriber_count(&self) -> usize {
        self.live()
            .map(|live| live.publisher.receiver_count())
            .unwrap_or(0)
    }

    pub fn ingress_addr(&self) -> Option<SocketAddr> {
        self.live().map(|live| live.ingress)
    }

    pub fn egress_addr(&self) -> Option<SocketAddr> {
        self.live().map(|live| live.egress)
    }

    fn live(&self) -> Option<Live> {
        self.live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for LakeBus {
    fn drop(&mut self) {
        if let Some(running) = self.tasks.get_mut().take() {
            running.terminate.store(true, Ordering::Release);
            running.listener.abort();
            running.ingress.abort();
            running.egress.abort();
        }
    }
}

fn lock(backlog: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
    backlog.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Listener {
    frames: mpsc::Receiver<String>,
    terminate: Arc<AtomicBool>,
    poll_interval: Duration,
    relay: Relay,
}

impl Listener {
    async fn run(mut self) {
        while !self.terminate.load(Ordering::Acquire) {
            match timeout(self.poll_interval, self.frames.recv()).await {
                Ok(Some(frame)) => self.relay.on_frame(frame).await,
                Ok(None) => break,
                Err(_) => continue,
            }
        }
        debug!("lake listener exited");
    }
}

/// Decides what happens to each received frame.
struct Relay {
    publisher: broadcast::Sender<String>,
    backlog: Backlog,
    handler: FrameHandlerRef,
    muted: Arc<AtomicBool>,
}

impl Relay {
    /// Empty frames and anything arriving while muted are dropped. A frame
    /// ending in `]` is a liveness probe: it is published twice and never
    /// recorded. Everything else is recorded in the backlog, then either
    /// answered by the handler or looped back unchanged.
    async fn on_frame(&self, frame: String) {
        if frame.is_empty() || self.muted.load(Ordering::Acquire) {
            return;
        }
        debug!(%frame, "lake received");

        if frame.ends_with(']') {
            self.publish(frame.clone());
            self.publish(frame);
            return;
        }

        lock(&self.backlog).push(frame.clone());

        if !self.handler.accepts(&frame) {
            self.publish(frame);
            return;
        }
        if let Some(reply) = self.handler.handle(&frame).await {
            self.publish(reply);
        }
    }

    fn publish(&self, frame: String) {
        let _ = self.publisher.send(frame);
    }
}
