// Shared domain types used across the API client and the engine.

pub mod notification;

pub use notification::*;
