use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::types::Permission;
use crate::types::{Badge, Notification, NotificationId};

use super::state::Snapshot;

/// Handle to the sync engine held by the UI layer.
///
/// Cheaply cloneable. When the last handle is dropped the sender channel
/// closes, signalling the engine to shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: tokio::sync::mpsc::UnboundedSender<Request>,
}

impl EngineHandle {
    pub(super) fn new(tx: tokio::sync::mpsc::UnboundedSender<Request>) -> Self {
        Self { tx }
    }

    /// Send a request to the engine. Non-blocking.
    pub fn send(&self, req: Request) {
        // Ignore errors: if the receiver is gone the engine has already shut down.
        let _ = self.tx.send(req);
    }

    pub fn load_notifications(&self, page: u32) {
        self.send(Request::LoadNotifications { page });
    }

    pub fn update_unread_count(&self) {
        self.send(Request::RefreshUnreadCount);
    }

    pub fn mark_notification_read(&self, id: impl Into<NotificationId>) {
        self.send(Request::MarkRead { id: id.into() });
    }

    pub fn mark_all_notifications_read(&self) {
        self.send(Request::MarkAllRead);
    }

    pub fn display_notification(&self, notification: Notification) {
        self.send(Request::DisplayPushed { notification });
    }

    /// Close a pushed notification before its display window ends.
    pub fn dismiss_notification(&self, id: impl Into<NotificationId>) {
        self.send(Request::Dismiss { id: id.into() });
    }

    /// The user clicked a platform notification: close it and mark it read.
    pub fn activate_notification(&self, id: impl Into<NotificationId>) {
        self.send(Request::Activate { id: id.into() });
    }

    pub fn start_polling(&self) {
        self.send(Request::StartPolling);
    }

    pub fn stop_polling(&self) {
        self.send(Request::StopPolling);
    }

    /// Ask the engine for a copy of its state, waiting up to `timeout`.
    ///
    /// Blocks the calling thread; the engine runs on its own.
    pub fn snapshot(&self, timeout: Duration) -> Option<Snapshot> {
        let (reply_tx, reply_rx) = std::sync::mpsc::channel();
        self.send(Request::Snapshot { reply_tx });
        reply_rx.recv_timeout(timeout).ok()
    }

    /// Stop polling and shut the engine down.
    pub fn disconnect(&self) {
        self.send(Request::Shutdown);
    }
}

/// Trait implemented by every engine flavour.
pub trait Engine: Send + 'static {
    fn start(self) -> EngineHandle;
}

/// All operations the UI layer can send to the engine.
pub enum Request {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------
    LoadNotifications {
        page: u32,
    },
    RefreshUnreadCount,
    Snapshot {
        reply_tx: Sender<Snapshot>,
    },

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------
    MarkRead {
        id: NotificationId,
    },
    MarkAllRead,

    // -----------------------------------------------------------------------
    // Push delivery
    // -----------------------------------------------------------------------
    DisplayPushed {
        notification: Notification,
    },
    Dismiss {
        id: NotificationId,
    },
    Activate {
        id: NotificationId,
    },
    RegisterPushToken,

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------
    StartPolling,
    StopPolling,
    Shutdown,
}

/// All events the engine pushes to the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -----------------------------------------------------------------------
    // State changes
    // -----------------------------------------------------------------------
    /// The list was replaced by a freshly loaded page.
    ListReplaced {
        page: u32,
        notifications: Vec<Notification>,
    },
    BadgeUpdated {
        badge: Badge,
    },
    /// Read flags changed locally (optimistic flip or rollback).
    ReadFlagsChanged {
        ids: Vec<NotificationId>,
        is_read: bool,
    },
    PushedShown {
        notification: Notification,
    },
    PushedExpired {
        id: NotificationId,
    },
    PushedDismissed {
        id: NotificationId,
    },
    PollingChanged {
        active: bool,
    },
    PermissionResolved {
        permission: Permission,
    },

    // -----------------------------------------------------------------------
    // Outcomes
    // -----------------------------------------------------------------------
    /// Unified error event for all read failures.
    FetchError {
        context: String,
        message: String,
    },
    MutationOk {
        description: String,
    },
    MutationError {
        description: String,
        message: String,
    },
}
