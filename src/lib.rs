// src/lib.rs
//! Job-posting relay between an internal hiring UI and a hosted recruiting
//! platform.
//!
//! Every outbound call goes through [`recruit::RecruitClient`], which gets
//! its credential from the process-wide [`oauth::TokenManager`].

pub mod config;
pub mod database;
pub mod error;
pub mod oauth;
pub mod portals;
pub mod recruit;
pub mod web;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{RelayError, Result};
pub use web::start_web_server;

/// `app_log!(info, "...")` forwards to the matching `tracing` macro.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}
