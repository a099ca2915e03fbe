use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::api::client::HttpBackend;
use crate::api::{ApiError, NotificationBackend};
use crate::types::{Notification, NotificationId};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

const LIST_PATH: &str = "/notifications/";
const UNREAD_COUNT_PATH: &str = "/notifications/unread-count/";
const MARK_ALL_READ_PATH: &str = "/notifications/mark-all-read/";
const PUSH_REGISTER_PATH: &str = "/notifications/push/register/";

/// Items stay raw so one malformed entry cannot sink the whole page.
#[derive(Debug, Deserialize)]
struct NotificationPage {
    notifications: Option<Vec<serde_json::Value>>,
}

impl NotificationPage {
    fn into_notifications(self, path: &str) -> Result<Vec<Notification>, ApiError> {
        let items = self
            .notifications
            .ok_or_else(|| ApiError::decode(path, "missing `notifications` field"))?;
        Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value(raw) {
                Ok(notification) => Some(notification),
                Err(e) => {
                    tracing::warn!("api: skipping malformed notification #{index} from {path}: {e}");
                    None
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct UnreadCount {
    unread_count: u64,
}

#[derive(Debug, Serialize)]
struct PushRegistration<'a> {
    token: &'a str,
    device_type: &'a str,
}

fn mark_read_path(id: &NotificationId) -> String {
    format!("/notifications/{id}/mark-read/")
}

/// Generate a placeholder web push token: `web_<unix-millis>_<9 chars>`.
///
/// The server stores it verbatim; no real push service is behind it.
pub fn generate_push_token() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("web_{millis}_{}", &suffix[..9])
}

// ---------------------------------------------------------------------------
// REST calls
// ---------------------------------------------------------------------------

impl NotificationBackend for HttpBackend {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Notification>, ApiError> {
        let page = page.max(1);
        let body: NotificationPage = self
            .get_json(LIST_PATH, &[("page", page.to_string())])
            .await?;
        body.into_notifications(LIST_PATH)
    }

    async fn fetch_unread_count(&self) -> Result<u64, ApiError> {
        let body: UnreadCount = self.get_json(UNREAD_COUNT_PATH, &[]).await?;
        Ok(body.unread_count)
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        self.post::<()>(&mark_read_path(id), None).await
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.post::<()>(MARK_ALL_READ_PATH, None).await
    }

    async fn register_push_token(&self, token: &str) -> Result<(), ApiError> {
        let body = PushRegistration {
            token,
            device_type: "web",
        };
        self.post(PUSH_REGISTER_PATH, Some(&body)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_token_shape() {
        let token = generate_push_token();
        let parts: Vec<&str> = token.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "web");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn push_tokens_differ() {
        assert_ne!(generate_push_token(), generate_push_token());
    }

    #[test]
    fn mark_read_path_embeds_id() {
        assert_eq!(
            mark_read_path(&NotificationId::from(12)),
            "/notifications/12/mark-read/"
        );
    }

    #[test]
    fn malformed_items_are_skipped() {
        let page: NotificationPage = serde_json::from_str(
            r#"{"notifications": [
                {"id": "a", "created_at": "2025-03-10T12:00:00Z"},
                {"title": "no id"},
                {"id": "c", "is_read": "yes"},
                {"id": "d", "priority": null, "created_at": "2025-03-10T12:00:00.5"}
            ]}"#,
        )
        .unwrap();
        let items = page.into_notifications(LIST_PATH).unwrap();
        let ids: Vec<&str> = items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "d"]);
    }

    #[test]
    fn missing_notifications_field_is_decode_error() {
        let page: NotificationPage = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(matches!(
            page.into_notifications(LIST_PATH),
            Err(ApiError::Decode { .. })
        ));
    }

    #[test]
    fn page_without_notifications_field_parses_as_none() {
        let page: NotificationPage = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.notifications.is_none());
    }
}
