// Notification capability
// Transient toasts raised by the submission flows

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str, kind: ToastKind);
}

/// Holds the toast currently on screen. A new toast replaces the previous
/// one; a toast expires after the configured display duration.
pub struct ToastCenter {
    current: Mutex<Option<(Toast, Instant)>>,
    display_for: Duration,
    next_id: AtomicU64,
}

impl ToastCenter {
    pub fn new(display_for: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            display_for,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn active(&self) -> Option<Toast> {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some((_, shown_at)) if shown_at.elapsed() >= self.display_for => {
                *current = None;
                None
            }
            Some((toast, _)) => Some(toast.clone()),
            None => None,
        }
    }

    /// Most recent toast, ignoring expiry
    pub fn last(&self) -> Option<Toast> {
        self.current.lock().as_ref().map(|(toast, _)| toast.clone())
    }

    pub fn dismiss(&self) {
        self.current.lock().take();
    }

    pub fn shown_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst) - 1
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, message: &str, kind: ToastKind) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        info!(id, ?kind, text = message, "toast");
        let toast = Toast {
            id,
            message: message.to_string(),
            kind,
        };
        *self.current.lock() = Some((toast, Instant::now()));
    }
}
