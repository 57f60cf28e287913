//! Credentials file handling.
//!
//! The file lives at `~/.webfrc` and holds two `key=value` lines:
//!
//! ```text
//! username=<username>
//! password=<password>
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use lazy_regex::regex_captures;
use thiserror::Error;

/// Name of the credentials file inside the home directory.
pub const FILE_NAME: &str = ".webfrc";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't determine the home directory")]
    NoHome,
    #[error(
        "set your username/password in {}\nthe format is:\n  username=<username>\n  password=<password>",
        .path.display()
    )]
    Missing { path: PathBuf },
    #[error("couldn't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: expected `key=value`", .path.display())]
    Malformed { path: PathBuf, line: usize },
    #[error("{}: missing `{key}`", .path.display())]
    MissingKey { path: PathBuf, key: &'static str },
}
type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// `~/.webfrc`
pub fn default_path() -> ConfigResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(FILE_NAME))
        .ok_or(ConfigError::NoHome)
}

/// Read the credentials stored at `path`.
pub fn load(path: &Path) -> ConfigResult<Credentials> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse(&text, path)
}

/// Parse the contents of a credentials file, `path` is only used in errors.
pub fn parse(text: &str, path: &Path) -> ConfigResult<Credentials> {
    let mut username = None;
    let mut password = None;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((_, key, value)) = regex_captures!(r#"^([A-Za-z_][\w.-]*)\s*=\s*(.*)$"#, line)
        else {
            return Err(ConfigError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
            });
        };

        match key {
            "username" => username = Some(unquote(value).to_string()),
            "password" => password = Some(unquote(value).to_string()),
            other => log::debug!("ignoring key `{}` in {}", other, path.display()),
        }
    }

    let missing = |key| ConfigError::MissingKey {
        path: path.to_path_buf(),
        key,
    };
    Ok(Credentials {
        username: username.ok_or_else(|| missing("username"))?,
        password: password.ok_or_else(|| missing("password"))?,
    })
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
