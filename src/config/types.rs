use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub push: PushConfig,
    pub defaults: Defaults,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root the notification paths are appended to.
    pub base_url: String,
    /// `Cookie` header value; `csrftoken` is read from it for mutating calls.
    pub cookie: Option<String>,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_owned(),
            cookie: None,
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_secs: u64,
    pub push_display_secs: u64,
    /// Restore the unread flag of an item whose mark-read call failed.
    pub rollback_mark_read: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            push_display_secs: 5,
            rollback_mark_read: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Push / platform notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub permission: Permission,
    /// Answer a pending permission request with "granted".
    pub grant_on_request: bool,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            permission: Permission::Default,
            grant_on_request: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconPreset {
    #[default]
    Unicode,
    Ascii,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub date_format: String,
    pub icons: IconPreset,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            date_format: "relative".to_owned(),
            icons: IconPreset::Unicode,
        }
    }
}
