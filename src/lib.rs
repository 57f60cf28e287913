pub mod api;
pub use api::*;

pub mod cli;
pub mod config;
pub mod logger;

mod error;
pub use error::{Error, Result};
