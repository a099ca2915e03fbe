//! Plain-text rendering of notifications and engine events.

use crate::config::types::Defaults;
use crate::engine::Event;
use crate::icons::ResolvedIcons;
use crate::types::{Badge, Notification, NotificationId};
use crate::util::format_date;

/// Line-oriented rendering surface.
///
/// Mirrors the engine state from the events it receives so that every update
/// can be printed as a self-contained set of lines.
pub struct Renderer {
    icons: ResolvedIcons,
    date_format: String,
    items: Vec<Notification>,
    badge: Badge,
}

impl Renderer {
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            icons: ResolvedIcons::resolve(defaults.icons),
            date_format: defaults.date_format.clone(),
            items: Vec::new(),
            badge: Badge::from_count(0),
        }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn badge(&self) -> Badge {
        self.badge
    }

    /// One line per notification.
    pub fn render_notification(&self, n: &Notification) -> String {
        let marker = if n.is_read { " " } else { self.icons.unread.as_str() };
        let mut line = format!(
            "{marker} {} {} [{}] {}",
            self.icons.priority(n.priority),
            self.icons.notification_type(n.notification_type),
            n.id,
            n.title,
        );
        if !n.message.is_empty() {
            line.push_str(" - ");
            line.push_str(&n.message);
        }
        let when = n
            .created_at
            .as_ref()
            .map_or_else(|| "unknown".to_owned(), |dt| format_date(dt, &self.date_format));
        line.push_str(&format!(" ({when})"));
        if let Some(ref trip) = n.trip_id {
            line.push_str(&format!(" Trip: {trip}"));
        }
        line
    }

    pub fn render_list(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec!["No notifications".to_owned()];
        }
        self.items
            .iter()
            .map(|n| self.render_notification(n))
            .collect()
    }

    /// Badge text; empty when hidden.
    pub fn render_badge(&self) -> String {
        if self.badge.visible {
            format!("{} {}", self.icons.badge, self.badge.count)
        } else {
            String::new()
        }
    }

    fn set_read(&mut self, ids: &[NotificationId], is_read: bool) {
        for n in self.items.iter_mut().filter(|n| ids.contains(&n.id)) {
            n.is_read = is_read;
        }
    }

    /// Fold an engine event into the mirrored state and return what to print.
    pub fn apply(&mut self, event: &Event) -> Vec<String> {
        match event {
            Event::ListReplaced { notifications, .. } => {
                self.items.clone_from(notifications);
                self.render_list()
            }
            Event::BadgeUpdated { badge } => {
                self.badge = *badge;
                let text = self.render_badge();
                vec![if text.is_empty() {
                    "No unread notifications".to_owned()
                } else {
                    format!("Unread: {text}")
                }]
            }
            Event::ReadFlagsChanged { ids, is_read } => {
                self.set_read(ids, *is_read);
                let state = if *is_read { "read" } else { "unread" };
                ids.iter().map(|id| format!("{id} marked {state}")).collect()
            }
            Event::PushedShown { notification } => {
                self.items.retain(|n| n.id != notification.id);
                self.items.insert(0, notification.clone());
                vec![format!("New: {}", self.render_notification(notification))]
            }
            Event::PushedExpired { id } | Event::PushedDismissed { id } => {
                self.items.retain(|n| &n.id != id);
                Vec::new()
            }
            Event::PollingChanged { active } => {
                vec![if *active {
                    "Polling for unread notifications".to_owned()
                } else {
                    "Polling stopped".to_owned()
                }]
            }
            Event::PermissionResolved { permission } => {
                vec![format!("Desktop notifications: {permission:?}")]
            }
            Event::FetchError { context, message } => vec![format!("✗ {context}: {message}")],
            Event::MutationOk { description } => vec![format!("✓ {description}")],
            Event::MutationError {
                description,
                message,
            } => vec![format!("✗ {description}: {message}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::types::IconPreset;
    use crate::types::{NotificationType, Priority};

    fn renderer() -> Renderer {
        Renderer::new(&Defaults {
            date_format: "relative".to_owned(),
            icons: IconPreset::Ascii,
        })
    }

    fn notif(id: &str) -> Notification {
        Notification {
            id: id.into(),
            title: "Bus 12".to_owned(),
            message: "arrives in 5 minutes".to_owned(),
            notification_type: NotificationType::BusArrived,
            priority: Priority::High,
            is_read: false,
            created_at: Some(Utc::now()),
            trip_id: Some("77".to_owned()),
        }
    }

    #[test]
    fn empty_list_has_placeholder() {
        let r = renderer();
        assert_eq!(r.render_list(), vec!["No notifications".to_owned()]);
    }

    #[test]
    fn notification_line_contents() {
        let r = renderer();
        let line = r.render_notification(&notif("a"));
        assert_eq!(
            line,
            "* !! [bus] [a] Bus 12 - arrives in 5 minutes (Just now) Trip: 77"
        );
    }

    #[test]
    fn missing_timestamp_renders_unknown() {
        let r = renderer();
        let mut n = notif("a");
        n.created_at = None;
        n.trip_id = None;
        assert_eq!(
            r.render_notification(&n),
            "* !! [bus] [a] Bus 12 - arrives in 5 minutes (unknown)"
        );
    }

    #[test]
    fn badge_hidden_at_zero() {
        let mut r = renderer();
        r.apply(&Event::BadgeUpdated {
            badge: Badge::from_count(0),
        });
        assert_eq!(r.render_badge(), "");
        r.apply(&Event::BadgeUpdated {
            badge: Badge::from_count(3),
        });
        assert_eq!(r.render_badge(), "# 3");
    }

    #[test]
    fn read_flags_follow_events() {
        let mut r = renderer();
        r.apply(&Event::ListReplaced {
            page: 1,
            notifications: vec![notif("a"), notif("b")],
        });
        r.apply(&Event::ReadFlagsChanged {
            ids: vec!["b".into()],
            is_read: true,
        });
        assert!(!r.items()[0].is_read);
        assert!(r.items()[1].is_read);
    }

    #[test]
    fn pushed_items_prepend_and_expire() {
        let mut r = renderer();
        r.apply(&Event::ListReplaced {
            page: 1,
            notifications: vec![notif("a")],
        });
        r.apply(&Event::PushedShown {
            notification: notif("p"),
        });
        assert_eq!(r.items()[0].id.as_str(), "p");
        r.apply(&Event::PushedExpired { id: "p".into() });
        assert_eq!(r.items().len(), 1);
    }
}
