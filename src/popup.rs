//! Popup notification state
//!
//! A popup is four independent observable cells: visibility, title, message
//! and style. Showing a popup overwrites all four and schedules the
//! visibility to drop after [`POPUP_DURATION`]. Scheduled hides are never
//! cancelled, so a popup shown while an earlier one is still up is hidden
//! when the earlier timer fires.
//!
//! Timers are spawned on the ambient tokio runtime.

use crate::constants::POPUP_DURATION;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Shared, subscribable value cell
///
/// Clones refer to the same cell.
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(&*self.tx.borrow()).finish()
    }
}

/// Visual style of a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Error,
    Success,
}

impl PopupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopupKind::Error => "error",
            PopupKind::Success => "success",
        }
    }
}

impl fmt::Display for PopupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Show an error popup and schedule it to hide
///
/// The returned handle completes once the popup has been hidden; dropping
/// it does not cancel the hide.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime, since the hide timer is
/// spawned onto the current runtime.
pub fn display_error_popup(
    show_notification: &Observable<bool>,
    notification_title: &Observable<String>,
    notification_message: &Observable<String>,
    notification_type: &Observable<String>,
    title: &str,
    message: &str,
) -> JoinHandle<()> {
    display_popup(
        PopupKind::Error,
        show_notification,
        notification_title,
        notification_message,
        notification_type,
        title,
        message,
    )
}

/// Show a success popup and schedule it to hide
///
/// # Panics
///
/// Panics if called outside of a tokio runtime, since the hide timer is
/// spawned onto the current runtime.
pub fn display_success_popup(
    show_notification: &Observable<bool>,
    notification_title: &Observable<String>,
    notification_message: &Observable<String>,
    notification_type: &Observable<String>,
    title: &str,
    message: &str,
) -> JoinHandle<()> {
    display_popup(
        PopupKind::Success,
        show_notification,
        notification_title,
        notification_message,
        notification_type,
        title,
        message,
    )
}

fn display_popup(
    kind: PopupKind,
    show_notification: &Observable<bool>,
    notification_title: &Observable<String>,
    notification_message: &Observable<String>,
    notification_type: &Observable<String>,
    title: &str,
    message: &str,
) -> JoinHandle<()> {
    notification_type.set(kind.as_str().to_string());
    notification_title.set(title.to_string());
    notification_message.set(message.to_string());
    show_notification.set(true);
    debug!(kind = %kind, title = %title, "Popup shown");

    // Deadline is fixed at call time, not when the task first runs
    let deadline = Instant::now() + POPUP_DURATION;
    let show_notification = show_notification.clone();
    tokio::spawn(async move {
        sleep_until(deadline).await;
        show_notification.set(false);
        debug!(kind = %kind, "Popup hidden");
    })
}

/// The four popup cells bundled together
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub show_notification: Observable<bool>,
    pub notification_title: Observable<String>,
    pub notification_message: Observable<String>,
    pub notification_type: Observable<String>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_error(&self, title: &str, message: &str) -> JoinHandle<()> {
        display_error_popup(
            &self.show_notification,
            &self.notification_title,
            &self.notification_message,
            &self.notification_type,
            title,
            message,
        )
    }

    pub fn show_success(&self, title: &str, message: &str) -> JoinHandle<()> {
        display_success_popup(
            &self.show_notification,
            &self.notification_title,
            &self.notification_message,
            &self.notification_type,
            title,
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_observable_shares_cell() {
        let cell = Observable::new(1);
        let clone = cell.clone();
        clone.set(2);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    #[should_panic]
    fn test_popup_requires_runtime() {
        let state = NotificationState::new();
        let _ = state.show_error("Error", "no runtime");
    }

    #[tokio::test]
    async fn test_observable_notifies_subscribers() {
        let cell = Observable::new(String::new());
        let mut rx = cell.subscribe();

        cell.set("hello".to_string());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_popup_sets_fields_then_hides() {
        let state = NotificationState::new();
        let hide = state.show_error("Error", "Could not load users");

        assert!(state.show_notification.get());
        assert_eq!(state.notification_type.get(), "error");
        assert_eq!(state.notification_title.get(), "Error");
        assert_eq!(state.notification_message.get(), "Could not load users");

        tokio::time::sleep(Duration::from_millis(3_999)).await;
        assert!(state.show_notification.get());

        hide.await.unwrap();
        assert!(!state.show_notification.get());
        // Only visibility is cleared
        assert_eq!(state.notification_title.get(), "Error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_popup_style() {
        let state = NotificationState::new();
        let hide = state.show_success("Saved", "Settings updated");
        assert_eq!(state.notification_type.get(), "success");
        hide.await.unwrap();
        assert!(!state.show_notification.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_timer_hides_later_popup() {
        let state = NotificationState::new();

        let first = state.show_error("Error", "first");
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        let second = state.show_success("Saved", "second");

        assert!(state.show_notification.get());
        assert_eq!(state.notification_type.get(), "success");

        // First timer fires 3s after the second popup appeared
        first.await.unwrap();
        assert!(!state.show_notification.get());
        assert_eq!(state.notification_message.get(), "second");
        assert!(!second.is_finished());

        second.await.unwrap();
        assert!(!state.show_notification.get());
    }
}
