use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{ApiError, NotificationBackend};
use crate::types::{Notification, NotificationId};

/// A stub backend that serves pre-loaded fixture data without any network calls.
///
/// Useful for integration tests and UI demos that must not require a running
/// server. Clones share the same state, so a test can keep one clone to
/// inspect calls while the engine owns another.
#[derive(Clone, Default)]
pub struct StubBackend {
    inner: Arc<Mutex<StubState>>,
}

#[derive(Default)]
struct StubState {
    pages: HashMap<u32, Vec<Notification>>,
    unread_count: u64,
    fail_reads: bool,
    fail_mutations: bool,
    calls: StubCalls,
}

/// Record of every call the stub received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubCalls {
    pub pages: Vec<u32>,
    pub unread_count: usize,
    pub mark_read: Vec<NotificationId>,
    pub mark_all_read: usize,
    pub push_tokens: Vec<String>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_page(self, page: u32, notifications: Vec<Notification>) -> Self {
        self.lock().pages.insert(page, notifications);
        self
    }

    pub fn with_unread_count(self, count: u64) -> Self {
        self.set_unread_count(count);
        self
    }

    pub fn set_unread_count(&self, count: u64) {
        self.lock().unread_count = count;
    }

    /// Make every GET answer HTTP 500.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make every POST answer HTTP 500.
    pub fn fail_mutations(&self, fail: bool) {
        self.lock().fail_mutations = fail;
    }

    pub fn calls(&self) -> StubCalls {
        self.lock().calls.clone()
    }
}

fn server_error(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_owned(),
        status: 500,
    }
}

impl NotificationBackend for StubBackend {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Notification>, ApiError> {
        let mut state = self.lock();
        state.calls.pages.push(page);
        if state.fail_reads {
            return Err(server_error("/notifications/"));
        }
        Ok(state.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn fetch_unread_count(&self) -> Result<u64, ApiError> {
        let mut state = self.lock();
        state.calls.unread_count += 1;
        if state.fail_reads {
            return Err(server_error("/notifications/unread-count/"));
        }
        Ok(state.unread_count)
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.mark_read.push(id.clone());
        if state.fail_mutations {
            return Err(server_error(&format!("/notifications/{id}/mark-read/")));
        }
        let mut flipped = false;
        for n in state.pages.values_mut().flatten() {
            if &n.id == id && !n.is_read {
                n.is_read = true;
                flipped = true;
            }
        }
        if flipped {
            state.unread_count = state.unread_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.mark_all_read += 1;
        if state.fail_mutations {
            return Err(server_error("/notifications/mark-all-read/"));
        }
        for n in state.pages.values_mut().flatten() {
            n.is_read = true;
        }
        state.unread_count = 0;
        Ok(())
    }

    async fn register_push_token(&self, token: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push_tokens.push(token.to_owned());
        if state.fail_mutations {
            return Err(server_error("/notifications/push/register/"));
        }
        Ok(())
    }
}
