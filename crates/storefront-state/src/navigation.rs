//! Route change requests raised by stores.

use tokio::sync::mpsc;
use tracing::debug;

/// Accepts a target route such as `/login`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for hosts without routing (CLI, tests that don't care).
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn navigate(&self, route: &str) {
        debug!(route, "Navigation requested (ignored)");
    }
}

/// Forwards route requests over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNavigator { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &str) {
        let _ = self.tx.send(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_navigator() {
        let (navigator, mut rx) = ChannelNavigator::new();
        navigator.navigate("/login");
        assert_eq!(rx.try_recv().unwrap(), "/login");
        assert!(rx.try_recv().is_err());
    }
}
