use async_trait::async_trait;

/// Consumer of frames that the bus does not simply loop back.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// Whether `frame` is addressed to this handler.
    fn accepts(&self, frame: &str) -> bool;

    /// Handles an accepted frame and returns the reply to publish, if any.
    async fn handle(&self, frame: &str) -> Option<String>;
}

pub type FrameHandlerRef = std::sync::Arc<dyn FrameHandler>;
