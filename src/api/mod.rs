//! Backend access: HTTP client and bearer credential providers

pub mod auth;
pub mod backend;

pub use auth::{EnvTokenProvider, FileTokenProvider, StaticTokenProvider, TokenProvider};
pub use backend::{HttpBackend, SummaryBackend};
