use reqwest::header::CONTENT_TYPE;
use reqwest::tls::Version;
use thiserror::Error;

use super::xml::{self, Response, ResponseError};
use super::Value;

/// Why a single remote call didn't produce a value.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("fault {code}: {message}")]
    Fault { code: i64, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("couldn't parse response: {0}")]
    Response(#[from] ResponseError),
}

/// Carries one XML-RPC call to the api and back.
pub trait Transport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, CallError>;
}

/// XML-RPC over HTTPS.
#[derive(Debug)]
pub struct HttpTransport {
    /// Use to make the POST requests
    client: reqwest::blocking::Client,
    /// Example: `https://api.webfaction.com/`
    url: String,
}

impl HttpTransport {
    /// `proxy` replaces whatever proxy the system would pick, `None` means
    /// a direct connection.
    pub fn new(url: &str, proxy: Option<&str>) -> reqwest::Result<HttpTransport> {
        let mut builder = reqwest::blocking::Client::builder()
            .https_only(true)
            .min_tls_version(Version::TLS_1_2)
            .user_agent(concat!("webfaction/", env!("CARGO_PKG_VERSION")))
            .no_proxy();

        if let Some(proxy) = proxy {
            log::debug!("using proxy {}", proxy);
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            url: url.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, CallError> {
        let body = xml::encode_call(method, params);

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()?;
        let text = resp.error_for_status()?.text()?;
        log::trace!("{} response: {}", method, text);

        match xml::decode_response(&text)? {
            Response::Success(value) => Ok(value),
            Response::Fault { code, message } => Err(CallError::Fault { code, message }),
        }
    }
}
