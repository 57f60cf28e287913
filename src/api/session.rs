use std::fmt::Display;

use thiserror::Error;

use super::Value;

/// Token handed out by `login`, first argument of every other call.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SessionId {
    id: String,
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&SessionId> for Value {
    fn from(session_id: &SessionId) -> Self {
        Value::String(session_id.id.clone())
    }
}

#[derive(Debug, Error)]
pub enum LoginResponseError {
    #[error("expected `[session_id, account]`, got {0:?}")]
    Shape(Value),
    #[error("empty session id is never valid")]
    Empty,
}

/// `login` answers with `[session_id, account]`.
#[derive(Debug)]
pub struct LoginResponse {
    pub session_id: SessionId,
    /// Account details (id, username, home directory, ...)
    pub account: Value,
}

impl LoginResponse {
    pub(crate) fn from_value(value: Value) -> Result<LoginResponse, LoginResponseError> {
        let Value::Array(items) = value else {
            return Err(LoginResponseError::Shape(value));
        };

        match <[Value; 2]>::try_from(items) {
            Ok([Value::String(id), account]) => {
                if id.is_empty() {
                    return Err(LoginResponseError::Empty);
                }
                Ok(LoginResponse {
                    session_id: SessionId { id },
                    account,
                })
            }
            Ok(items) => Err(LoginResponseError::Shape(Value::Array(items.into()))),
            Err(items) => Err(LoginResponseError::Shape(Value::Array(items))),
        }
    }
}
