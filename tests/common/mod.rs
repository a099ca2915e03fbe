#![allow(dead_code)]

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bus_notify::config::types::Permission;
use bus_notify::engine::{EngineSettings, Event};
use bus_notify::platform::PlatformNotifier;
use bus_notify::types::{Notification, NotificationId};

pub const WAIT: Duration = Duration::from_secs(3);

/// Settings with polling far enough out that it never fires during a test.
pub fn quiet_settings() -> EngineSettings {
    EngineSettings {
        poll_interval: Duration::from_secs(600),
        push_display: Duration::from_secs(5),
        rollback_mark_read: false,
    }
}

pub fn notif(id: &str, is_read: bool) -> Notification {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Notification {id}"),
        "message": "Your bus is on its way",
        "notification_type": "trip_update",
        "priority": "high",
        "is_read": is_read,
        "created_at": "2025-03-10T12:00:00Z",
        "trip_id": null
    }))
    .expect("valid notification fixture")
}

/// Receive events until one matches, returning it.
pub fn wait_for(rx: &Receiver<Event>, mut pred: impl FnMut(&Event) -> bool) -> Event {
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(event) if pred(&event) => return event,
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => panic!("expected event not received within {WAIT:?}"),
            Err(RecvTimeoutError::Disconnected) => panic!("engine event channel closed"),
        }
    }
}

/// Drain events for `window`, returning everything received.
pub fn collect_for(rx: &Receiver<Event>, window: Duration) -> Vec<Event> {
    let deadline = Instant::now() + window;
    let mut events = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return events;
        }
        match rx.recv_timeout(remaining) {
            Ok(event) => events.push(event),
            Err(_) => return events,
        }
    }
}

pub fn ids(notifications: &[Notification]) -> Vec<&str> {
    notifications.iter().map(|n| n.id.as_str()).collect()
}

/// Platform notifier with a fixed permission that records what it showed.
#[derive(Clone)]
pub struct RecordingNotifier {
    pub permission: Permission,
    pub shown: Arc<Mutex<Vec<NotificationId>>>,
}

impl RecordingNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shown(&self) -> Vec<NotificationId> {
        self.shown.lock().unwrap().clone()
    }
}

impl PlatformNotifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = Permission::Denied;
        }
        self.permission
    }

    fn show(&mut self, notification: &Notification) {
        self.shown.lock().unwrap().push(notification.id.clone());
    }
}
