//! TCP endpoints of the lake.
//!
//! Frames travel as newline terminated UTF-8 lines. The ingress endpoint
//! accepts any number of producers and funnels their frames into a single
//! queue; the egress endpoint fans every published frame out to all connected
//! subscribers. Aborting an endpoint task drops its listener and every
//! connection it accepted.

use crate::error::{LakeError, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn bind(endpoint: &'static str, addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| LakeError::Bind {
            endpoint,
            addr: addr.to_string(),
            source,
        })
}

/// Accepts producers and forwards every frame they write into `frames`.
pub fn spawn_ingress(listener: TcpListener, frames: mpsc::Sender<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "producer connected");
                        connections.spawn(pull(stream, frames.clone()));
                    }
                    Err(err) => {
                        warn!(%err, "ingress accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }
    })
}

/// Accepts subscribers and streams every published frame to each of them.
pub fn spawn_egress(listener: TcpListener, published: broadcast::Sender<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "subscriber connected");
                        connections.spawn(push(stream, published.subscribe()));
                    }
                    Err(err) => {
                        warn!(%err, "egress accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }
    })
}

async fn pull(stream: TcpStream, frames: mpsc::Sender<String>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(mut frame)) => {
                if frame.ends_with('\r') {
                    frame.pop();
                }
                if frames.send(frame).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                debug!(%err, "producer connection failed");
                break;
            }
        }
    }
}

async fn push(mut stream: TcpStream, mut frames: broadcast::Receiver<String>) {
    loop {
        match frames.recv().await {
            Ok(frame) => {
                let mut line = frame.into_bytes();
                line.push(b'\n');
                if let Err(err) = stream.write_all(&line).await {
                    debug!(%err, "subscriber connection failed");
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "subscriber lagging behind, frames skipped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
