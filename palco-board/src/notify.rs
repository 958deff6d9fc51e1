use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use shared::NotificationLevel;

const TOAST_TTL: Duration = Duration::from_secs(4);
const TOAST_CAP: usize = 5;

/// A transient user-facing notice.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

/// Bounded queue of toasts with a fixed time-to-live. Old entries fall off
/// either when they expire or when the queue is full.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Mutex<VecDeque<Toast>>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            ttl: TOAST_TTL,
        }
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
            created_at: Instant::now(),
        };
        let mut toasts = self.toasts.lock();
        toasts.push_back(toast);
        while toasts.len() > TOAST_CAP {
            toasts.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    /// Drop every toast older than the queue's time-to-live.
    pub fn expire(&self, now: Instant) {
        let ttl = self.ttl;
        self.toasts
            .lock()
            .retain(|toast| now.duration_since(toast.created_at) < ttl);
    }

    /// Current toasts, newest first.
    pub fn active(&self) -> Vec<Toast> {
        self.toasts.lock().iter().rev().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}
