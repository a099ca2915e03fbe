// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod command;
pub mod config;
pub mod engine;
pub mod icons;
pub mod platform;
pub mod render;
pub mod types;
pub(crate) mod util;
