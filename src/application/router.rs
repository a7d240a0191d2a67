use super::ledger::LedgerEngine;
use crate::domain::event::AccountEvent;
use crate::domain::ports::FrameHandler;
use crate::domain::status::StatusToken;
use crate::interfaces::wire::frame::{FrameError, is_vault_addressed, parse_frame};
use crate::interfaces::wire::reply::encode_reply;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns vault messages into ledger operations and ledger outcomes into
/// replies.
#[derive(Clone)]
pub struct Router {
    engine: Arc<LedgerEngine>,
}

impl Router {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<LedgerEngine> {
        &self.engine
    }

    pub async fn dispatch(&self, event: &AccountEvent) -> StatusToken {
        self.engine
            .process_account_event(
                &event.route.tenant,
                &event.route.account,
                event.operation,
                &event.transaction,
                event.amount.clone(),
                &event.currency,
            )
            .await
    }

    /// Handles one raw frame.
    ///
    /// Returns `None` for frames that cannot be answered; those are only
    /// logged.
    pub async fn route(&self, frame: &str) -> Option<String> {
        match parse_frame(frame) {
            Ok(event) => {
                let status = self.dispatch(&event).await;
                debug!(
                    tenant = %event.route.tenant,
                    account = %event.route.account,
                    operation = %event.operation,
                    %status,
                    "vault message processed"
                );
                Some(encode_reply(&event.route, &status))
            }
            Err(FrameError::UnknownOperation { route, code }) => {
                warn!(%code, frame, "unsupported order");
                Some(encode_reply(&route, &StatusToken::Error))
            }
            Err(err) => {
                warn!(%err, frame, "unknown message received");
                None
            }
        }
    }
}

#[async_trait]
impl FrameHandler for Router {
    fn accepts(&self, frame: &str) -> bool {
        is_vault_addressed(frame)
    }

    async fn handle(&self, frame: &str) -> Option<String> {
        self.route(frame).await
    }
}
