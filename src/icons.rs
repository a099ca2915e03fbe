use crate::config::types::IconPreset;
use crate::types::{NotificationType, Priority};

/// Fully resolved icon set: every slot has a concrete `String` value.
#[derive(Debug, Clone)]
pub struct ResolvedIcons {
    // Priority (4)
    pub priority_urgent: String,
    pub priority_high: String,
    pub priority_medium: String,
    pub priority_low: String,
    // Notification type (7)
    pub type_booking_confirmed: String,
    pub type_booking_cancelled: String,
    pub type_bus_delay: String,
    pub type_bus_arrived: String,
    pub type_seat_available: String,
    pub type_trip_update: String,
    pub type_general: String,
    // State (2)
    pub unread: String,
    pub badge: String,
}

impl ResolvedIcons {
    /// Emoji set, the default preset.
    fn unicode() -> Self {
        Self {
            // Priority
            priority_urgent: "\u{1f534}".to_owned(), // 🔴
            priority_high: "\u{1f7e0}".to_owned(),   // 🟠
            priority_medium: "\u{1f7e1}".to_owned(), // 🟡
            priority_low: "\u{1f7e2}".to_owned(),    // 🟢
            // Notification type
            type_booking_confirmed: "\u{2705}".to_owned(), // ✅
            type_booking_cancelled: "\u{274c}".to_owned(), // ❌
            type_bus_delay: "\u{23f0}".to_owned(),         // ⏰
            type_bus_arrived: "\u{1f68c}".to_owned(),      // 🚌
            type_seat_available: "\u{1f4ba}".to_owned(),   // 💺
            type_trip_update: "\u{1f4e2}".to_owned(),      // 📢
            type_general: "\u{1f4e2}".to_owned(),          // 📢
            // State
            unread: "\u{25cf}".to_owned(), // ●
            badge: "\u{1f514}".to_owned(), // 🔔
        }
    }

    /// Plain ASCII for terminals without emoji fonts.
    fn ascii() -> Self {
        Self {
            priority_urgent: "!!!".to_owned(),
            priority_high: "!!".to_owned(),
            priority_medium: "!".to_owned(),
            priority_low: ".".to_owned(),
            type_booking_confirmed: "[ok]".to_owned(),
            type_booking_cancelled: "[x]".to_owned(),
            type_bus_delay: "[late]".to_owned(),
            type_bus_arrived: "[bus]".to_owned(),
            type_seat_available: "[seat]".to_owned(),
            type_trip_update: "[trip]".to_owned(),
            type_general: "[i]".to_owned(),
            unread: "*".to_owned(),
            badge: "#".to_owned(),
        }
    }

    pub fn resolve(preset: IconPreset) -> Self {
        match preset {
            IconPreset::Unicode => Self::unicode(),
            IconPreset::Ascii => Self::ascii(),
        }
    }

    pub fn priority(&self, priority: Priority) -> &str {
        match priority {
            Priority::Urgent => &self.priority_urgent,
            Priority::High => &self.priority_high,
            Priority::Medium => &self.priority_medium,
            Priority::Low => &self.priority_low,
        }
    }

    pub fn notification_type(&self, kind: NotificationType) -> &str {
        match kind {
            NotificationType::BookingConfirmed => &self.type_booking_confirmed,
            NotificationType::BookingCancelled => &self.type_booking_cancelled,
            NotificationType::BusDelay => &self.type_bus_delay,
            NotificationType::BusArrived => &self.type_bus_arrived,
            NotificationType::SeatAvailable => &self.type_seat_available,
            NotificationType::TripUpdate => &self.type_trip_update,
            NotificationType::General => &self.type_general,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_preset_is_default() {
        let icons = ResolvedIcons::resolve(IconPreset::default());
        assert_eq!(icons.priority(Priority::Urgent), "\u{1f534}");
        assert_eq!(icons.notification_type(NotificationType::BusArrived), "\u{1f68c}");
    }

    #[test]
    fn general_and_trip_update_share_an_icon() {
        let icons = ResolvedIcons::resolve(IconPreset::Unicode);
        assert_eq!(
            icons.notification_type(NotificationType::General),
            icons.notification_type(NotificationType::TripUpdate)
        );
    }

    #[test]
    fn ascii_preset() {
        let icons = ResolvedIcons::resolve(IconPreset::Ascii);
        assert!(icons.priority(Priority::High).is_ascii());
        assert!(icons.notification_type(NotificationType::SeatAvailable).is_ascii());
        assert!(icons.unread.is_ascii());
    }
}
