use thiserror::Error;

use crate::api::{CallError, LoginResponseError};
use crate::config::ConfigError;

/// Everything that can keep a [`Client`](crate::Client) from being built.
///
/// Failures of individual operations never show up here, they are logged
/// and collapsed into the operation's failure value instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("invalid http client configuration: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("login failed: {0}")]
    Login(#[source] CallError),
    #[error("unexpected login response: {0}")]
    Session(#[from] LoginResponseError),
}
pub type Result<T> = std::result::Result<T, Error>;
