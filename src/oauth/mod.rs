// src/oauth/mod.rs
//! OAuth credentials for the recruiting provider.
//!
//! - [`client`]: HTTP grants against the identity provider
//! - [`token_manager`]: the single owner of the live token state
//! - [`types`]: credentials, token state and token endpoint payloads

pub mod client;
pub mod token_manager;
pub mod types;

pub use client::OAuthClient;
pub use token_manager::TokenManager;
pub use types::{AuthStatus, Credentials, ProviderEndpoints, TokenSet, TokenState};
