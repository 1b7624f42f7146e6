//! Redirect hook used when the session cannot be recovered

use reqwest::StatusCode;
use tokio::sync::mpsc;
use tracing::warn;

/// A navigation request emitted by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: StatusCode,
    pub location: String,
}

/// Receives redirect requests, typically forwarding them to the UI layer
pub trait Navigator: Send + Sync + 'static {
    fn redirect(&self, status: StatusCode, location: &str);
}

/// Navigator that only logs the redirect
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, status: StatusCode, location: &str) {
        warn!(status = %status, location = %location, "Redirect requested");
    }
}

/// Navigator that forwards redirects over a channel
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Redirect>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Redirect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn redirect(&self, status: StatusCode, location: &str) {
        let redirect = Redirect {
            status,
            location: location.to_string(),
        };
        if self.tx.send(redirect).is_err() {
            warn!(status = %status, location = %location, "Redirect dropped, receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_navigator_forwards() {
        let (navigator, mut rx) = ChannelNavigator::new();
        navigator.redirect(StatusCode::UNAUTHORIZED, "/");

        let redirect = rx.try_recv().unwrap();
        assert_eq!(redirect.status, StatusCode::UNAUTHORIZED);
        assert_eq!(redirect.location, "/");
    }
}
