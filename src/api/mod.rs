mod client;
pub use client::{Client, ClientOptions, DatabaseUser, API_URL, DEFAULT_ACL_PERMISSION};

pub mod normalize;

mod session;
pub use session::{LoginResponse, LoginResponseError, SessionId};

mod transport;
pub use transport::{CallError, HttpTransport, Transport};

mod value;
pub use value::Value;

pub mod xml;

#[cfg(test)]
pub(crate) mod testing;
