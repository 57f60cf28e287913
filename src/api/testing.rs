//! Scripted transport for exercising the client without a network.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use super::{CallError, Client, ClientOptions, Transport, Value};

/// Every call a [`MockTransport`] has seen, in order.
pub(crate) type Calls = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

pub(crate) struct MockTransport<F> {
    calls: Calls,
    handler: F,
}

impl<F> Transport for MockTransport<F>
where
    F: Fn(&str, &[Value]) -> Result<Value, CallError>,
{
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, CallError> {
        self.calls
            .borrow_mut()
            .push((method.to_string(), params.to_vec()));
        (self.handler)(method, params)
    }
}

/// Transport answering with `handler`, plus the log of what it was asked.
pub(crate) fn recording<F>(handler: F) -> (MockTransport<F>, Calls)
where
    F: Fn(&str, &[Value]) -> Result<Value, CallError>,
{
    let calls = Calls::default();
    let transport = MockTransport {
        calls: Rc::clone(&calls),
        handler,
    };
    (transport, calls)
}

/// Client logged in as `u`/`p` with session `S1`, later calls go to `handler`.
pub(crate) fn client_with<F>(handler: F) -> (Client, Calls)
where
    F: Fn(&str, &[Value]) -> Result<Value, CallError> + 'static,
{
    let (transport, calls) = recording(move |method: &str, params: &[Value]| {
        if method == "login" {
            let account: Value = [("username".to_string(), Value::from("u"))]
                .into_iter()
                .collect();
            return Ok(Value::Array(vec!["S1".into(), account]));
        }
        handler(method, params)
    });

    let options = ClientOptions::default().with_credentials("u", "p");
    let client = Client::with_transport(Box::new(transport), &options).unwrap();
    (client, calls)
}

pub(crate) fn fault(code: i64, message: &str) -> CallError {
    CallError::Fault {
        code,
        message: message.to_string(),
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Keeps every record on the thread that logged it.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Run `f` and return what it logged on this thread.
pub(crate) fn captured_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });

    RECORDS.with(|records| records.borrow_mut().clear());
    let out = f();
    (out, RECORDS.with(|records| records.take()))
}
