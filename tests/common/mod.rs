#![allow(dead_code)]

use lake_mock::application::ledger::LedgerEngine;
use lake_mock::application::router::Router;
use lake_mock::config::BusConfig;
use lake_mock::domain::account::{Amount, Balance};
use lake_mock::infrastructure::bus::LakeBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

pub const POLL: Duration = Duration::from_millis(100);
const WAIT: Duration = Duration::from_secs(3);

pub fn config() -> BusConfig {
    BusConfig::ephemeral().with_poll_interval(POLL)
}

/// Running lake on ephemeral ports with vault account `T1/A1` (USD, balance
/// checked).
pub async fn started_lake() -> (LakeBus, Arc<LedgerEngine>) {
    let engine = Arc::new(LedgerEngine::new());
    engine
        .create_account("T1", "A1", "USD".parse().unwrap(), true)
        .await;
    let bus = LakeBus::new(config(), Arc::new(Router::new(Arc::clone(&engine))));
    bus.start().await.expect("lake should start");
    (bus, engine)
}

pub async fn producer(bus: &LakeBus) -> TcpStream {
    let addr = bus.ingress_addr().expect("lake is not running");
    TcpStream::connect(addr).await.expect("connect to ingress")
}

pub async fn push(stream: &mut TcpStream, frame: &str) {
    stream
        .write_all(format!("{frame}\n").as_bytes())
        .await
        .expect("write frame");
}

/// Next published frame, failing the test after a few seconds.
pub async fn next_frame(published: &mut broadcast::Receiver<String>) -> String {
    tokio::time::timeout(WAIT, published.recv())
        .await
        .expect("no frame published in time")
        .expect("egress closed")
}

/// Polls `condition` until it holds or a few seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

pub fn amount(value: &str) -> Amount {
    value.parse().expect("decimal literal")
}

pub fn balance(value: &str) -> Balance {
    value.parse().expect("decimal literal")
}
