//! REST surface of the notification service.

use std::future::Future;

use crate::types::{Notification, NotificationId};

pub mod client;
pub mod csrf;
mod error;
pub mod notifications;

pub use client::HttpBackend;
pub use error::ApiError;
pub use notifications::generate_push_token;

/// Operations the sync engine needs from the server.
///
/// Implemented by `HttpBackend` for the real service and by
/// `engine::StubBackend` for tests and demos.
pub trait NotificationBackend: Send + Sync + 'static {
    /// `GET /notifications/?page=N`
    fn fetch_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Notification>, ApiError>> + Send;

    /// `GET /notifications/unread-count/`
    fn fetch_unread_count(&self) -> impl Future<Output = Result<u64, ApiError>> + Send;

    /// `POST /notifications/{id}/mark-read/`
    fn mark_read(&self, id: &NotificationId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /notifications/mark-all-read/`
    fn mark_all_read(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /notifications/push/register/`
    fn register_push_token(&self, token: &str)
    -> impl Future<Output = Result<(), ApiError>> + Send;
}
