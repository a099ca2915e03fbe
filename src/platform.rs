//! Platform notification collaborator: permission state and display.

use std::io::Write;

use crate::config::types::{Permission, PushConfig};
use crate::types::Notification;

/// Permission + display API of the host platform.
///
/// The engine owns exactly one notifier and only calls it from its run loop.
pub trait PlatformNotifier: Send + 'static {
    fn permission(&self) -> Permission;

    /// Ask the user. Only meaningful while the permission is `Default`.
    fn request_permission(&mut self) -> Permission;

    /// Show a notification outside the notification list.
    fn show(&mut self, notification: &Notification);
}

/// Notifier for terminal sessions: rings the bell and prints a one-line
/// banner on stderr.
pub struct TerminalNotifier {
    permission: Permission,
    grant_on_request: bool,
}

impl TerminalNotifier {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            permission: config.permission,
            grant_on_request: config.grant_on_request,
        }
    }
}

impl PlatformNotifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
            tracing::info!("platform: permission resolved to {:?}", self.permission);
        }
        self.permission
    }

    fn show(&mut self, notification: &Notification) {
        let mut stderr = std::io::stderr().lock();
        // Best effort: a closed stderr must not take the engine down.
        let _ = writeln!(
            stderr,
            "\x07[{}] {}: {}",
            notification.priority.as_str(),
            notification.title,
            notification.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(permission: Permission, grant_on_request: bool) -> TerminalNotifier {
        TerminalNotifier::new(&PushConfig {
            permission,
            grant_on_request,
        })
    }

    #[test]
    fn request_resolves_default_permission() {
        let mut n = notifier(Permission::Default, true);
        assert_eq!(n.request_permission(), Permission::Granted);
        assert_eq!(n.permission(), Permission::Granted);

        let mut n = notifier(Permission::Default, false);
        assert_eq!(n.request_permission(), Permission::Denied);
    }

    #[test]
    fn decided_permission_is_sticky() {
        let mut n = notifier(Permission::Denied, true);
        assert_eq!(n.request_permission(), Permission::Denied);

        let mut n = notifier(Permission::Granted, false);
        assert_eq!(n.request_permission(), Permission::Granted);
    }
}
